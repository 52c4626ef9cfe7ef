//! Coalescing rules applied to a queue on every enqueue.
//!
//! The incoming message's command token selects one [`Rule`]. The rule
//! carries whatever it pre-parsed from the incoming message and finds at
//! most one queued message that the incoming one supersedes.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::queue::message::{
    INVALIDATE_CURSOR, INVALIDATE_VIEW_CURSOR, Message, PROGRESS, SET_PART, SETVALUE_MARKER, TILE,
};
use crate::queue::tile::TileDesc;

const VIEW_ID_FIELD: &str = "viewId";

#[derive(Debug)]
pub(crate) enum Rule {
    /// Replace the queued render of the same tile.
    Tile { desc: TileDesc, hash: u32 },
    /// Replace the queued message with the same command.
    SameCommand(&'static str),
    /// Replace the queued live progress value.
    ProgressValue,
    /// Replace the queued cursor invalidation for the same view.
    ViewCursor(String),
    Append,
}

impl Rule {
    /// Picks the rule for `incoming`, caching its tile position hash.
    ///
    /// Must run under the owning queue's lock.
    pub(crate) fn for_message(incoming: &mut Message) -> Rule {
        let mut rule = Self::select(incoming);
        if let Rule::Tile { hash, .. } = &mut rule {
            *hash = incoming.cache_position_hash(*hash);
        }
        rule
    }

    fn select(incoming: &Message) -> Rule {
        match incoming.command_token() {
            TILE => match TileDesc::parse(incoming.first_line()) {
                Ok(desc) => Rule::Tile {
                    hash: desc.position_hash(),
                    desc,
                },
                Err(err) => {
                    debug!(id = incoming.id(), "not coalescing malformed tile: {err}");
                    Rule::Append
                }
            },
            INVALIDATE_CURSOR => Rule::SameCommand(INVALIDATE_CURSOR),
            SET_PART => Rule::SameCommand(SET_PART),
            PROGRESS if incoming.contains(SETVALUE_MARKER) => Rule::ProgressValue,
            INVALIDATE_VIEW_CURSOR => match incoming.json_field(VIEW_ID_FIELD) {
                Ok(view_id) => Rule::ViewCursor(view_id),
                Err(err) => {
                    debug!(id = incoming.id(), "not coalescing malformed view cursor: {err}");
                    Rule::Append
                }
            },
            _ => Rule::Append,
        }
    }

    /// Index of the queued message this rule removes, if any.
    pub(crate) fn find_superseded(&self, queue: &VecDeque<Message>) -> Option<usize> {
        match self {
            Rule::Tile { desc, hash } => queue.iter().position(|cur| same_tile(desc, *hash, cur)),
            Rule::SameCommand(token) => queue.iter().position(|cur| cur.first_token_matches(token)),
            Rule::ProgressValue => queue
                .iter()
                .position(|cur| cur.first_token_matches(PROGRESS) && cur.contains(SETVALUE_MARKER)),
            Rule::ViewCursor(view_id) => queue.iter().position(|cur| {
                cur.first_token_matches(INVALIDATE_VIEW_CURSOR)
                    && cur
                        .json_field(VIEW_ID_FIELD)
                        .is_ok_and(|queued| &queued == view_id)
            }),
            Rule::Append => None,
        }
    }
}

fn same_tile(desc: &TileDesc, hash: u32, cur: &Message) -> bool {
    if !cur.first_token_matches(TILE) || cur.cached_position_hash() != Some(hash) {
        return false;
    }
    match TileDesc::parse(cur.first_line()) {
        Ok(queued) if queued == *desc => true,
        Ok(_) => {
            trace!("unusual - tile {desc} has position hash collision with {} of {hash}", cur.first_line());
            false
        }
        Err(_) => false,
    }
}
