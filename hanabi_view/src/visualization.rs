use crate::{CardFace, ViewState};

/// A compact text rendering of the table, one area per line.
///
/// ```text
///  hints 7/8   lives 3/3   deck 30   score 1
///  piles  W0 R1 B0 Y0 G0
///  bot    Y1 W2 R2 G2 B5
///  you    ·  ·  ·  ·  ·
///  trash  G5
/// ```
pub fn summarize(view: &ViewState) -> String {
    if let Some(banner) = view.connection.banner() {
        return format!(" {}", banner);
    }
    if view.own_hand.is_empty() && view.partner_hand.is_empty() {
        return String::from(" Waiting for the server...");
    }

    let mut result = format!(
        " hints {}/8   lives {}/3   deck {}   score {}",
        view.hints_remaining, view.mistakes_remaining, view.deck_remaining, view.score
    );
    if view.game_over {
        result += "   GAME OVER";
    } else if view.is_player_turn {
        result += "   your turn";
    }

    result += "\n piles ";
    for (color, height) in view.piles.iter() {
        result += &format!(" {}{}", color.letter(), height);
    }

    result += "\n bot   ";
    for card in &view.partner_hand {
        result += &format!(" {}", card.face);
    }

    result += "\n you   ";
    for card in &view.own_hand {
        let face = match &card.revealed {
            Some(face) => face.to_string(),
            None if card.hinted => String::from("* "),
            None => String::from("· "),
        };
        result += &format!(" {}", face);
    }

    result += "\n trash ";
    if view.discards.is_empty() {
        result += " -";
    }
    for face in &view.discards {
        result += &format!(" {}", face);
    }

    if let Some(message) = view.hint_message() {
        result += &format!("\n \"{}\"", message);
    }
    result
}

/// Short label for a card in a log or prompt.
pub fn label(face: &CardFace) -> String {
    match face {
        CardFace::Known(card) => card.to_string(),
        CardFace::Unreadable(code) => format!("?{}?", code),
    }
}

#[cfg(test)]
mod tests {
    use hanabi::card;

    use super::*;
    use crate::{ConnectionStatus, DisconnectReason, OwnCard, PartnerCard};

    #[test]
    fn banner_wins() {
        let view = ViewState {
            connection: ConnectionStatus::Lost(DisconnectReason::Closed),
            ..ViewState::default()
        };
        assert_eq!(summarize(&view), " The game has ended.");
    }

    #[test]
    fn table() {
        let view = ViewState {
            connection: ConnectionStatus::Connected,
            hints_remaining: 7,
            mistakes_remaining: 3,
            deck_remaining: 30,
            partner_hand: vec![PartnerCard {
                id: None,
                face: CardFace::Known(card!("1y")),
                hints: Default::default(),
            }],
            own_hand: vec![OwnCard {
                id: None,
                hints: Default::default(),
                note: None,
                revealed: None,
                hinted: false,
            }],
            discards: vec![CardFace::Unreadable(String::from("xx"))],
            ..ViewState::default()
        };
        let text = summarize(&view);
        assert!(text.starts_with(" hints 7/8   lives 3/3   deck 30   score 0"));
        assert!(text.contains("\n bot    Y1"));
        assert!(text.contains("\n trash  ??"));
        assert_eq!(label(&view.discards[0]), "?xx?");
    }
}
