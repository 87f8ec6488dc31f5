//! Like/dislike state for one viewing session.

use serde::{Deserialize, Serialize};

use super::entities::Engagement;

/// Button the viewer pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionKind {
    Like,
    Dislike,
}

/// Viewer's current reaction. Liked and disliked are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reaction {
    #[default]
    Neither,
    Liked,
    Disliked,
}

impl Reaction {
    pub fn is_liked(&self) -> bool {
        matches!(self, Reaction::Liked)
    }

    pub fn is_disliked(&self) -> bool {
        matches!(self, Reaction::Disliked)
    }

    /// Apply a button press to the counters and return the new reaction.
    ///
    /// Pressing the active button clears it. Pressing the other one switches,
    /// moving one count from the old counter to the new one.
    pub fn toggle(self, pressed: ReactionKind, counters: &mut Engagement) -> Reaction {
        match (self, pressed) {
            (Reaction::Liked, ReactionKind::Like) => {
                counters.likes = counters.likes.saturating_sub(1);
                Reaction::Neither
            }
            (Reaction::Disliked, ReactionKind::Dislike) => {
                counters.dislikes = counters.dislikes.saturating_sub(1);
                Reaction::Neither
            }
            (current, ReactionKind::Like) => {
                if current.is_disliked() {
                    counters.dislikes = counters.dislikes.saturating_sub(1);
                }
                counters.likes += 1;
                Reaction::Liked
            }
            (current, ReactionKind::Dislike) => {
                if current.is_liked() {
                    counters.likes = counters.likes.saturating_sub(1);
                }
                counters.dislikes += 1;
                Reaction::Disliked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counters(likes: u64, dislikes: u64) -> Engagement {
        Engagement {
            views: 0,
            likes,
            dislikes,
        }
    }

    #[test]
    fn test_like_then_unlike() {
        let mut c = counters(10, 2);
        let r = Reaction::Neither.toggle(ReactionKind::Like, &mut c);
        assert_eq!(r, Reaction::Liked);
        assert_eq!(c, counters(11, 2));

        let r = r.toggle(ReactionKind::Like, &mut c);
        assert_eq!(r, Reaction::Neither);
        assert_eq!(c, counters(10, 2));
    }

    #[test]
    fn test_like_then_dislike_switches() {
        let mut c = counters(10, 2);
        let r = Reaction::Neither
            .toggle(ReactionKind::Like, &mut c)
            .toggle(ReactionKind::Dislike, &mut c);

        assert_eq!(r, Reaction::Disliked);
        assert_eq!(c.likes, 10);
        assert_eq!(c.dislikes, 3);
    }

    fn kind() -> impl Strategy<Value = ReactionKind> {
        prop_oneof![Just(ReactionKind::Like), Just(ReactionKind::Dislike)]
    }

    proptest! {
        #[test]
        fn prop_each_toggle_moves_counters_by_at_most_one(
            likes in 0u64..1_000,
            dislikes in 0u64..1_000,
            presses in proptest::collection::vec(kind(), 1..64),
        ) {
            let mut c = counters(likes, dislikes);
            let mut reaction = Reaction::Neither;

            for pressed in presses {
                let before = c;
                reaction = reaction.toggle(pressed, &mut c);

                let dl = c.likes as i64 - before.likes as i64;
                let dd = c.dislikes as i64 - before.dislikes as i64;
                prop_assert!(dl.abs() <= 1 && dd.abs() <= 1);
                match pressed {
                    ReactionKind::Like => prop_assert_eq!(dl.abs(), 1),
                    ReactionKind::Dislike => prop_assert_eq!(dd.abs(), 1),
                }
                prop_assert!(!(reaction.is_liked() && reaction.is_disliked()));
            }

            // Net effect is exactly the current reaction on top of the baseline
            let expect_likes = likes + u64::from(reaction.is_liked());
            let expect_dislikes = dislikes + u64::from(reaction.is_disliked());
            prop_assert_eq!(c.likes, expect_likes);
            prop_assert_eq!(c.dislikes, expect_dislikes);
        }
    }
}
