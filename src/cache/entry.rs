/// Zweiwertiger Cache-Eintrag.
///
/// `Unresolved` ist ein echter Negativ-Eintrag: der Schlüssel wurde versucht,
/// ist für die Dauer der geladenen Welt ungültig und wird nicht erneut gelesen.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry<T> {
    /// Bereits versucht, nicht auflösbar
    Unresolved,
    /// Aufgelöster Wert
    Resolved(T),
}

impl<T> CacheEntry<T> {
    /// Wandelt ein `Option` in einen Eintrag um.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Resolved(value),
            None => Self::Unresolved,
        }
    }

    /// Referenz auf den aufgelösten Wert.
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved => None,
        }
    }

    /// `true` für Negativ-Einträge.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_conversion() {
        assert_eq!(CacheEntry::from_option(Some(3)).resolved(), Some(&3));
        let missing: CacheEntry<u8> = CacheEntry::from_option(None);
        assert!(missing.is_unresolved());
        assert_eq!(missing.resolved(), None);
    }
}
