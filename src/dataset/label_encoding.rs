use std::collections::HashMap;

use crate::dataset::error::DatasetError;

/// Bijection between class label strings and dense integer codes in
/// `[0, num_classes)`. Labels are ordered lexicographically at fit time and
/// the mapping is immutable afterwards.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Fit over the distinct labels of `labels` (duplicates are fine).
    pub fn fit<I, S>(labels: I) -> LabelEncoder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();
        LabelEncoder { classes, codes }
    }

    pub fn encode(&self, label: &str) -> Result<usize, DatasetError> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| DatasetError::UnknownLabel {
                label: label.to_owned(),
            })
    }

    pub fn decode(&self, code: usize) -> Result<&str, DatasetError> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(DatasetError::UnknownCode { code })
    }

    /// Fitted labels in code order, so `classes()[code]` is `decode(code)`.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_orders_labels_lexicographically() {
        let enc = LabelEncoder::fit(["pear", "apple", "banana", "apple"]);
        assert_eq!(enc.classes(), ["apple", "banana", "pear"]);
        assert_eq!(enc.len(), 3);
    }

    #[test]
    fn encode_and_decode_are_inverses() {
        let enc = LabelEncoder::fit(["mug", "bowl", "cap"]);
        for code in 0..enc.len() {
            let label = enc.decode(code).unwrap();
            assert_eq!(enc.encode(label).unwrap(), code);
        }
    }

    #[test]
    fn encode_unknown_label_fails() {
        let enc = LabelEncoder::fit(["mug"]);
        assert!(matches!(
            enc.encode("bowl"),
            Err(DatasetError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn decode_out_of_domain_code_fails() {
        let enc = LabelEncoder::fit(["mug"]);
        assert!(matches!(
            enc.decode(1),
            Err(DatasetError::UnknownCode { code: 1 })
        ));
    }
}
