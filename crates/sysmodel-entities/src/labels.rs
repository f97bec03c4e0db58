//! Label map updates.

use std::collections::HashMap;

/// String-keyed labels attached to most entities.
pub type Labels = HashMap<String, String>;

/// Apply an add-set and a remove-set to `labels`.
///
/// Additions run before removals, so a key named in both sets ends up absent.
pub fn apply_label_update(
    labels: &mut Labels,
    add: Option<&Labels>,
    remove: Option<&[String]>,
) {
    if let Some(add) = add {
        for (k, v) in add {
            labels.insert(k.clone(), v.clone());
        }
    }
    if let Some(remove) = remove {
        for k in remove {
            labels.remove(k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn no_sets_leaves_labels_unchanged() {
        let mut l = labels(&[("env", "prod")]);
        apply_label_update(&mut l, None, None);
        assert_eq!(l, labels(&[("env", "prod")]));
    }

    #[test]
    fn additions_overwrite_existing_values() {
        let mut l = labels(&[("env", "prod")]);
        apply_label_update(&mut l, Some(&labels(&[("env", "dev"), ("tier", "1")])), None);
        assert_eq!(l, labels(&[("env", "dev"), ("tier", "1")]));
    }

    #[test]
    fn key_in_both_sets_is_removed() {
        let mut l = Labels::new();
        let remove = vec!["a".to_string()];
        apply_label_update(&mut l, Some(&labels(&[("a", "1")])), Some(&remove));
        assert!(!l.contains_key("a"));
    }

    #[test]
    fn removing_missing_key_is_a_noop() {
        let mut l = labels(&[("x", "1")]);
        apply_label_update(&mut l, None, Some(&["y".to_string()]));
        assert_eq!(l, labels(&[("x", "1")]));
    }
}
