use serde::{Deserialize, Serialize};
/*
    dto for the form posted to POST /message
*/

/// Campi del form di invio messaggio. Se un campo manca vale "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub message: String,
}

impl SubmitForm {
    /// Costruisce il form da coppie chiave/valore già url-decodificate.
    /// Per ogni campo vince il primo valore non vuoto, i valori vuoti vengono scartati
    /// e le chiavi sconosciute ignorate.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut form = SubmitForm::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "username" => &mut form.username,
                "message" => &mut form.message,
                _ => continue,
            };
            if slot.is_empty() {
                *slot = value.to_string();
            }
        }
        form
    }
}
