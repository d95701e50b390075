use std::collections::BTreeMap;

use hanabi::CardId;

/// Free-text notes the player attaches to cards.
///
/// Keyed by [`CardId`] so a note follows its card when the hand is
/// reordered. Notes never leave the client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: BTreeMap<CardId, String>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note for a card. Empty text removes the note.
    pub fn set(&mut self, card_id: CardId, text: String) {
        if text.is_empty() {
            self.notes.remove(&card_id);
        } else {
            self.notes.insert(card_id, text);
        }
    }

    pub fn get(&self, card_id: CardId) -> Option<&str> {
        self.notes.get(&card_id).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardId, &str)> {
        self.notes.iter().map(|(&id, text)| (id, text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut notes = NoteStore::new();
        notes.set(CardId(3), String::from("maybe a 5"));
        notes.set(CardId(4), String::from("red"));
        assert_eq!(notes.get(CardId(3)), Some("maybe a 5"));
        notes.set(CardId(3), String::from("surely a 5"));
        assert_eq!(notes.get(CardId(3)), Some("surely a 5"));
        notes.set(CardId(4), String::new());
        assert_eq!(notes.get(CardId(4)), None);
        assert_eq!(notes.len(), 1);
        notes.clear();
        assert!(notes.is_empty());
    }
}
