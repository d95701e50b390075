use crate::{Card, Color, Rank};

impl quickcheck::Arbitrary for Color {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&Color::ALL).unwrap()
    }
}

impl quickcheck::Arbitrary for Rank {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&Rank::ALL).unwrap()
    }
}

impl quickcheck::Arbitrary for Card {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Self {
            color: Color::arbitrary(g),
            rank: Rank::arbitrary(g),
        }
    }
}
