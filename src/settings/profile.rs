//! Per-user profile fields
//!
//! A small ordered list of label/value pairs shown on a user's fediverse
//! profile. Labels need not be unique.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Maximum number of profile fields per user
pub const MAX_PROFILE_FIELDS: usize = 4;

/// A single label/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileField {
    pub label: String,
    pub value: String,
}

impl ProfileField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Bounded, insertion-ordered list of profile fields
///
/// Never holds more than [`MAX_PROFILE_FIELDS`] entries, including when
/// deserialized from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProfileField>", into = "Vec<ProfileField>")]
pub struct ProfileFieldList {
    fields: Vec<ProfileField>,
}

impl ProfileFieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one field
    ///
    /// # Errors
    /// `ListFull` if the list already holds the maximum; the list is
    /// left unchanged.
    pub fn append(
        &mut self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConfigError> {
        if self.fields.len() >= MAX_PROFILE_FIELDS {
            return Err(ConfigError::ListFull {
                max: MAX_PROFILE_FIELDS,
            });
        }
        self.fields.push(ProfileField::new(label, value));
        Ok(())
    }

    /// Replace the whole list
    ///
    /// Over-length input is rejected as a whole, never truncated.
    ///
    /// # Errors
    /// `TooManyFields` if more than the maximum is supplied; the list is
    /// left unchanged.
    pub fn replace_all<I>(&mut self, pairs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = ProfileField>,
    {
        let pairs: Vec<ProfileField> = pairs.into_iter().collect();
        if pairs.len() > MAX_PROFILE_FIELDS {
            return Err(ConfigError::TooManyFields {
                count: pairs.len(),
                max: MAX_PROFILE_FIELDS,
            });
        }
        self.fields = pairs;
        Ok(())
    }

    /// Fields in insertion order
    pub fn to_ordered_sequence(&self) -> Vec<ProfileField> {
        self.fields.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<ProfileField>> for ProfileFieldList {
    type Error = ConfigError;

    fn try_from(fields: Vec<ProfileField>) -> Result<Self, Self::Error> {
        let mut list = Self::new();
        list.replace_all(fields)?;
        Ok(list)
    }
}

impl From<ProfileFieldList> for Vec<ProfileField> {
    fn from(list: ProfileFieldList) -> Self {
        list.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(count: usize) -> Vec<ProfileField> {
        (0..count)
            .map(|i| ProfileField::new(format!("label {i}"), format!("value {i}")))
            .collect()
    }

    #[test]
    fn fifth_append_is_rejected() {
        let mut list = ProfileFieldList::new();
        for i in 0..4 {
            list.append(format!("label {i}"), "v").unwrap();
        }

        assert_eq!(list.append("label 4", "v"), Err(ConfigError::ListFull { max: 4 }));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn replace_all_rejects_overlong_input_without_change() {
        let mut list = ProfileFieldList::new();
        list.replace_all(pairs(2)).unwrap();
        let before = list.clone();

        assert_eq!(
            list.replace_all(pairs(5)),
            Err(ConfigError::TooManyFields { count: 5, max: 4 })
        );
        assert_eq!(list, before);
    }

    #[test]
    fn replace_all_accepts_limit_and_empties() {
        let mut list = ProfileFieldList::new();
        list.replace_all(pairs(4)).unwrap();
        assert_eq!(list.to_ordered_sequence(), pairs(4));

        list.replace_all(Vec::new()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn order_is_insertion_order_and_labels_may_repeat() {
        let mut list = ProfileFieldList::new();
        list.append("Website", "https://a.example").unwrap();
        list.append("Website", "https://b.example").unwrap();
        list.append("Pronouns", "they/them").unwrap();

        let labels: Vec<&str> = list.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Website", "Website", "Pronouns"]);
        assert_eq!(list.to_ordered_sequence()[1].value, "https://b.example");
    }

    #[test]
    fn deserialization_enforces_bound() {
        let json = serde_json::to_string(&pairs(5)).unwrap();
        assert!(serde_json::from_str::<ProfileFieldList>(&json).is_err());

        let json = serde_json::to_string(&pairs(3)).unwrap();
        let list: ProfileFieldList = serde_json::from_str(&json).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(serde_json::to_string(&list).unwrap(), json);
    }
}
