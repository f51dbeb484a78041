//! Generic key-casing conversion.

use crate::schema::BackendCasing;

/// Convert a backend key to the frontend convention.
///
/// Keys containing an underscore are camelCased: the letter following each
/// underscore is uppercased and the underscore dropped. Anything else only
/// has its first character lowercased, which tolerates PascalCase input
/// (`Nom` -> `nom`) and leaves already-camelCase keys untouched.
pub fn normalize_key(key: &str) -> String {
    if key.contains('_') {
        let mut out = String::with_capacity(key.len());
        let mut chars = key.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '_' {
                match chars.peek() {
                    Some(next) if next.is_ascii_lowercase() => {
                        out.push(next.to_ascii_uppercase());
                        chars.next();
                    }
                    // Underscore not followed by a lowercase letter is
                    // kept verbatim (`code_2`, trailing underscores).
                    _ => out.push('_'),
                }
            } else {
                out.push(c);
            }
        }
        out
    } else {
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Default outbound conversion for keys without an explicit schema rule.
pub fn backend_key(key: &str, casing: BackendCasing) -> String {
    match casing {
        BackendCasing::Snake => {
            let mut out = String::with_capacity(key.len() + 2);
            for c in key.chars() {
                if c.is_ascii_uppercase() {
                    out.push('_');
                    out.push(c.to_ascii_lowercase());
                } else {
                    out.push(c);
                }
            }
            out
        }
        BackendCasing::Pascal => {
            let mut chars = key.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        BackendCasing::Preserve => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_keys_become_camel() {
        assert_eq!(normalize_key("code_client"), "codeClient");
        assert_eq!(normalize_key("montant_verse"), "montantVerse");
        assert_eq!(normalize_key("peut_etre_supprime"), "peutEtreSupprime");
    }

    #[test]
    fn pascal_keys_lose_leading_capital() {
        assert_eq!(normalize_key("Nom"), "nom");
        assert_eq!(normalize_key("CodeClient"), "codeClient");
    }

    #[test]
    fn camel_keys_are_untouched() {
        assert_eq!(normalize_key("clientId"), "clientId");
        assert_eq!(normalize_key("numexp"), "numexp");
    }

    #[test]
    fn normalization_is_idempotent() {
        for k in ["code_client", "Nom", "clientId", "statut_display"] {
            let once = normalize_key(k);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn underscore_without_lowercase_follower_is_kept() {
        assert_eq!(normalize_key("code_2"), "code_2");
    }

    #[test]
    fn backend_key_snake() {
        assert_eq!(backend_key("clientId", BackendCasing::Snake), "client_id");
        assert_eq!(backend_key("poids", BackendCasing::Snake), "poids");
    }

    #[test]
    fn backend_key_pascal() {
        assert_eq!(backend_key("nom", BackendCasing::Pascal), "Nom");
        assert_eq!(backend_key("codeClient", BackendCasing::Pascal), "CodeClient");
    }
}
