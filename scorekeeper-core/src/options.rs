//! # Match Options
//!
//! Every sport is configured before a match starts: the length of a quarter, the points needed
//! to win a set, the number of timeouts and so on. This module provides this kind of
//! configuration via [`MatchOption`] using a key-value map. [`OptionValue`] contains all types
//! supported.
//!
//! The options accepted by a sport, including their defaults, are returned by
//! [`Rules::options`]. A [`MatchOptionValues`] list is validated against them with
//! [`MatchOptionValues::merge`].
//!
//! [`Rules::options`]: crate::Rules::options
use std::collections::btree_map::{BTreeMap, Iter, Keys};
use std::fmt::{self, Display, Formatter};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown key {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: expected {expected}, found {found}")]
    InvalidValue {
        key: String,
        found: String,
        expected: &'static str,
    },
    #[error("malformed option {0:?}: expected key=value")]
    Malformed(String),
}

/// A list of named options with their default values. [`MatchOptionValues`] should be used when
/// just expecting a list of key-value pairs.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchOptions(BTreeMap<String, MatchOption>);

impl MatchOptions {
    /// Creates a new [`Builder`].
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the option with the given `key`. Returns `None` if the given key does not exist.
    pub fn get(&self, key: &str) -> Option<&MatchOption> {
        self.0.get(key)
    }

    /// Returns an iterator over all keys.
    pub fn keys(&self) -> Keys<'_, String, MatchOption> {
        self.0.keys()
    }

    /// Returns an iterator over all [`MatchOption`]s, ordered by key.
    pub fn iter(&self) -> Iter<'_, String, MatchOption> {
        self.0.iter()
    }

    /// Parses a `key=value` assignment. The value is parsed as the type of the default value of
    /// `key`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if the assignment is malformed, `key` is unknown or the value
    /// cannot be parsed as the expected type.
    pub fn parse_assignment(&self, input: &str) -> Result<(String, OptionValue), Error> {
        let (key, value) = input
            .split_once('=')
            .ok_or_else(|| Error::Malformed(input.to_owned()))?;

        let key = key.trim();
        let value = value.trim();

        let option = self
            .0
            .get(key)
            .ok_or_else(|| Error::UnknownKey(key.to_owned()))?;

        let invalid = || Error::InvalidValue {
            key: key.to_owned(),
            found: value.to_owned(),
            expected: option.value.value_type(),
        };

        let value = match option.value {
            OptionValue::Bool(_) => OptionValue::Bool(value.parse().map_err(|_| invalid())?),
            OptionValue::U64(_) => OptionValue::U64(value.parse().map_err(|_| invalid())?),
            OptionValue::String(_) => OptionValue::String(value.to_owned()),
        };

        Ok((key.to_owned(), value))
    }
}

impl From<MatchOptions> for MatchOptionValues {
    fn from(this: MatchOptions) -> Self {
        Self(
            this.0
                .into_iter()
                .map(|(key, option)| (key, option.value))
                .collect(),
        )
    }
}

/// A list of key-values for a match which only contains the values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchOptionValues(BTreeMap<String, OptionValue>);

impl MatchOptionValues {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the [`OptionValue`] with the given `key`. Returns `None` if no value exist for the
    /// given `key`.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: ToString,
        V: Into<OptionValue>,
    {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn iter(&self) -> Iter<'_, String, OptionValue> {
        self.0.iter()
    }

    /// Validates the values against `options` and fills all unset keys with the defaults from
    /// `options`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a key is not part of `options` or a value has a different type
    /// than the default value of its key.
    pub fn merge(mut self, options: MatchOptions) -> Result<Self, Error> {
        for (key, value) in self.0.iter() {
            let default = match options.0.get(key) {
                Some(option) => &option.value,
                None => return Err(Error::UnknownKey(key.to_owned())),
            };

            if default.value_type() != value.value_type() {
                return Err(Error::InvalidValue {
                    key: key.to_owned(),
                    found: value.to_string(),
                    expected: default.value_type(),
                });
            }
        }

        for (key, option) in options.0 {
            self.0.entry(key).or_insert(option.value);
        }

        Ok(self)
    }

    /// Returns the [`U64`] value of `key` as a `u32`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if `key` is missing, is not a [`U64`] or does not fit into a
    /// `u32`.
    ///
    /// [`U64`]: OptionValue::U64
    pub fn get_u32(&self, key: &str) -> Result<u32, Error> {
        match self.0.get(key) {
            Some(OptionValue::U64(value)) => {
                u32::try_from(*value).map_err(|_| Error::InvalidValue {
                    key: key.to_owned(),
                    found: value.to_string(),
                    expected: "u32",
                })
            }
            Some(value) => Err(Error::InvalidValue {
                key: key.to_owned(),
                found: value.to_string(),
                expected: "u64",
            }),
            None => Err(Error::UnknownKey(key.to_owned())),
        }
    }

    /// Same as [`get_u32`] but rejects a value of `0`.
    ///
    /// [`get_u32`]: Self::get_u32
    pub fn get_positive(&self, key: &str) -> Result<u32, Error> {
        match self.get_u32(key)? {
            0 => Err(Error::InvalidValue {
                key: key.to_owned(),
                found: String::from("0"),
                expected: "a positive integer",
            }),
            value => Ok(value),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for MatchOptionValues
where
    K: ToString,
    V: Into<OptionValue>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.to_string(), value.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchOption {
    pub name: String,
    pub value: OptionValue,
}

/// The value of a [`MatchOption`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OptionValue {
    Bool(bool),
    U64(u64),
    String(String),
}

impl OptionValue {
    /// Returns the name of the type of this value.
    pub fn value_type(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U64(_) => "u64",
            Self::String(_) => "string",
        }
    }

    /// Returns the contained [`Bool`] value or the provided default.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scorekeeper_core::options::OptionValue;
    /// let val = OptionValue::U64(0);
    /// assert!(val.unwrap_bool_or(true));
    /// ```
    ///
    /// [`Bool`]: Self::Bool
    #[inline]
    pub fn unwrap_bool_or(&self, default: bool) -> bool {
        match self {
            Self::Bool(val) => *val,
            _ => default,
        }
    }
}

impl Display for OptionValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Bool(val) => val.fmt(f),
            Self::U64(val) => val.fmt(f),
            Self::String(val) => val.fmt(f),
        }
    }
}

impl From<bool> for OptionValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for OptionValue {
    #[inline]
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<u32> for OptionValue {
    #[inline]
    fn from(value: u32) -> Self {
        Self::U64(value.into())
    }
}

impl<'a> From<&'a str> for OptionValue {
    #[inline]
    fn from(value: &'a str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for OptionValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A builder for [`MatchOptions`].
#[derive(Clone, Debug, Default)]
pub struct Builder {
    options: MatchOptions,
}

impl Builder {
    /// Inserts a new [`MatchOption`]. If the `key` already exists, it is overwritten.
    pub fn option<T, V>(mut self, key: &'static str, name: T, value: V) -> Self
    where
        T: ToString,
        V: Into<OptionValue>,
    {
        self.options.0.insert(
            key.to_string(),
            MatchOption {
                name: name.to_string(),
                value: value.into(),
            },
        );
        self
    }

    /// Consumes the `Builder`, returning the collected [`MatchOptions`].
    #[inline]
    pub fn build(self) -> MatchOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, MatchOptionValues, MatchOptions, OptionValue};

    fn options() -> MatchOptions {
        MatchOptions::builder()
            .option("points_per_set", "Points per set", 25_u64)
            .option("timeouts", "Timeouts per set", 2_u64)
            .option("enable_shot_clock", "Shot clock", true)
            .build()
    }

    #[test]
    fn test_merge_fills_defaults() {
        let mut values = MatchOptionValues::new();
        values.set("points_per_set", 15_u64);

        let values = values.merge(options()).unwrap();

        assert_eq!(values.get("points_per_set"), Some(&OptionValue::U64(15)));
        assert_eq!(values.get("timeouts"), Some(&OptionValue::U64(2)));
        assert_eq!(values.get("enable_shot_clock"), Some(&OptionValue::Bool(true)));
    }

    #[test]
    fn test_merge_rejects_unknown_and_mistyped() {
        let values: MatchOptionValues = [("quarters", 4_u64)].into_iter().collect();
        assert_eq!(
            values.merge(options()).unwrap_err(),
            Error::UnknownKey(String::from("quarters"))
        );

        let values: MatchOptionValues = [("timeouts", true)].into_iter().collect();
        assert_eq!(
            values.merge(options()).unwrap_err(),
            Error::InvalidValue {
                key: String::from("timeouts"),
                found: String::from("true"),
                expected: "u64",
            }
        );
    }

    #[test]
    fn test_get_positive() {
        let values: MatchOptionValues = [("timeouts", 0_u64), ("points_per_set", 21_u64)]
            .into_iter()
            .collect();

        assert_eq!(values.get_u32("timeouts"), Ok(0));
        assert!(values.get_positive("timeouts").is_err());
        assert_eq!(values.get_positive("points_per_set"), Ok(21));

        let values: MatchOptionValues = [("timeouts", u64::MAX)].into_iter().collect();
        assert!(values.get_u32("timeouts").is_err());
    }

    #[test]
    fn test_parse_assignment() {
        let options = options();

        assert_eq!(
            options.parse_assignment("points_per_set = 15").unwrap(),
            (String::from("points_per_set"), OptionValue::U64(15))
        );
        assert_eq!(
            options.parse_assignment("enable_shot_clock=false").unwrap(),
            (String::from("enable_shot_clock"), OptionValue::Bool(false))
        );
        assert_eq!(
            options.parse_assignment("timeouts").unwrap_err(),
            Error::Malformed(String::from("timeouts"))
        );
        assert_eq!(
            options.parse_assignment("quarters=4").unwrap_err(),
            Error::UnknownKey(String::from("quarters"))
        );
        assert!(matches!(
            options.parse_assignment("timeouts=two"),
            Err(Error::InvalidValue { .. })
        ));
    }
}
