// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "pt";

const PT: &[(&str, &str)] = &[
    ("validation_error", "Um ou mais campos são inválidos."),
    ("email_already_exists", "Este e-mail já está em uso."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("user_not_found", "Usuário não encontrado."),
    ("referral_not_found", "Indicação não encontrada."),
    ("unit_not_found", "Unidade não encontrada."),
    ("referral_code_not_found", "Código de indicação inválido."),
    ("reward_not_found", "Recompensa não encontrada."),
    ("reward_not_eligible", "A recompensa só pode ser vinculada a uma indicação aprovada feita pelo próprio usuário."),
    ("invalid_query", "Parâmetros de consulta inválidos."),
    ("forbidden", "Você não tem permissão para realizar esta ação."),
    ("status_not_allowed", "Seu cargo não pode mover a indicação para este status."),
    ("status_unchanged", "A indicação já está neste status."),
    ("rejection_reason_required", "Informe o motivo da reprovação."),
    ("self_referral", "Você não pode indicar a si mesmo."),
    ("already_referred", "Este contato já foi indicado."),
    ("conflict", "Registro duplicado."),
    ("export_failed", "Não foi possível gerar o arquivo de exportação."),
    ("internal_error", "Ocorreu um erro inesperado."),
];

const EN: &[(&str, &str)] = &[
    ("validation_error", "One or more fields are invalid."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Missing or invalid authentication token."),
    ("user_not_found", "User not found."),
    ("referral_not_found", "Referral not found."),
    ("unit_not_found", "Unit not found."),
    ("referral_code_not_found", "Invalid referral code."),
    ("reward_not_found", "Reward not found."),
    ("reward_not_eligible", "A reward can only be tied to an approved referral made by the same user."),
    ("invalid_query", "Invalid query parameters."),
    ("forbidden", "You are not allowed to perform this action."),
    ("status_not_allowed", "Your role cannot move the referral to this status."),
    ("status_unchanged", "The referral already has this status."),
    ("rejection_reason_required", "A rejection reason is required."),
    ("self_referral", "You cannot refer yourself."),
    ("already_referred", "This contact has already been referred."),
    ("conflict", "Duplicate record."),
    ("export_failed", "Could not generate the export file."),
    ("internal_error", "An unexpected error occurred."),
];

/// Mensagens de erro por idioma, carregadas uma vez no `AppState`.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("pt", PT.iter().copied().collect());
        messages.insert("en", EN.iter().copied().collect());
        Self { messages }
    }

    // Idioma desconhecido cai no português; chave desconhecida volta como está
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_is_translated_in_both_languages() {
        let pt: Vec<_> = PT.iter().map(|(k, _)| *k).collect();
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(pt, en);
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(store.translate("fr", "self_referral"), "Você não pode indicar a si mesmo.");
        assert_eq!(store.translate("en", "self_referral"), "You cannot refer yourself.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "nope"), "nope");
    }
}
