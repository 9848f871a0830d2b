// src/models/patch.rs

use serde::{Deserialize, Deserializer};

/// Campo anulável de edição parcial, usado como `Option<Option<T>>`:
/// ausente = não altera, `null` = limpa, valor = grava.
/// Precisa de `#[serde(default)]` no campo.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// `(mexe no campo?, novo valor)` para os binds do UPDATE.
pub fn patch_parts<T: Clone>(field: &Option<Option<T>>) -> (bool, Option<T>) {
    (field.is_some(), field.clone().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Edit {
        #[serde(default, deserialize_with = "deserialize_some")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Edit = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.phone, None);
        assert_eq!(patch_parts(&absent.phone), (false, None));

        let cleared: Edit = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(cleared.phone, Some(None));
        assert_eq!(patch_parts(&cleared.phone), (true, None));

        let set: Edit = serde_json::from_str(r#"{"phone": "11 9999"}"#).unwrap();
        assert_eq!(patch_parts(&set.phone), (true, Some("11 9999".to_string())));
    }
}
