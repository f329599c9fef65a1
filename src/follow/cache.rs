//! Compilation cache
//!
//! [`CompilerRegistry`] keeps the latest [`CompileInfo`] of every block, organized as
//! space → note → block, and one [`Compiler`] per space, created on first use. The host owns
//! the registry and prunes it from its outline: blocks that left a note, notes that left a
//! space, deleted spaces.
//!
//! Stored results are immutable `Arc`s; an update replaces the whole entry. Compiling off
//! the caller's thread goes through [`CompilerRegistry::begin`] and
//! [`CompilerRegistry::commit`]: tickets are numbered in call order and a result is only
//! stored if no later call for the same block has begun since.

use crate::follow::compiler::{CompileInfo, Compiler};
use crate::follow::config::CompilerConfig;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheKeyError {
    #[error("missing space id")]
    MissingSpace,
    #[error("missing note id")]
    MissingNote,
    #[error("missing block id")]
    MissingBlock,
}

/// Address of one block. All three ids are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    space: String,
    note: String,
    block: String,
}

impl CacheKey {
    pub fn new(
        space: impl Into<String>,
        note: impl Into<String>,
        block: impl Into<String>,
    ) -> Result<Self, CacheKeyError> {
        let (space, note, block) = (space.into(), note.into(), block.into());
        if space.is_empty() {
            return Err(CacheKeyError::MissingSpace);
        }
        if note.is_empty() {
            return Err(CacheKeyError::MissingNote);
        }
        if block.is_empty() {
            return Err(CacheKeyError::MissingBlock);
        }
        Ok(Self { space, note, block })
    }

    pub fn space(&self) -> &str {
        &self.space
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn block(&self) -> &str {
        &self.block
    }
}

/// Handed out by [`CompilerRegistry::begin`]; its sequence number fixes the call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: CacheKey,
    sequence: u64,
}

impl Ticket {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

#[derive(Debug, Default)]
struct BlockEntry {
    info: Option<Arc<CompileInfo>>,
    /// Sequence of the newest ticket handed out for this block.
    latest: u64,
}

#[derive(Debug)]
struct SpaceEntry {
    compiler: Arc<Compiler>,
    notes: HashMap<String, HashMap<String, BlockEntry>>,
}

type CompilerFactory = Box<dyn Fn(&str) -> Compiler + Send + Sync>;

pub struct CompilerRegistry {
    factory: CompilerFactory,
    spaces: HashMap<String, SpaceEntry>,
    next_sequence: u64,
}

impl std::fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("spaces", &self.spaces)
            .field("next_sequence", &self.next_sequence)
            .finish_non_exhaustive()
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl CompilerRegistry {
    /// Every space gets a compiler with `config`.
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_factory(move |_| Compiler::new(config.clone()))
    }

    /// Build each space's compiler with `factory`, called with the space id.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Compiler + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            spaces: HashMap::new(),
            next_sequence: 1,
        }
    }

    fn space_entry(&mut self, space: &str) -> &mut SpaceEntry {
        let factory = &self.factory;
        self.spaces.entry(space.to_string()).or_insert_with(|| {
            debug!(space, "creating compiler");
            SpaceEntry {
                compiler: Arc::new(factory(space)),
                notes: HashMap::new(),
            }
        })
    }

    /// The space's compiler, created if this is the first time the space is seen.
    pub fn compiler(&mut self, space: &str) -> Arc<Compiler> {
        Arc::clone(&self.space_entry(space).compiler)
    }

    /// Compile `text` as the block at `space`/`note`/`block` and store the result,
    /// replacing whatever was stored for that block.
    pub fn compile(
        &mut self,
        space: &str,
        note: &str,
        block: &str,
        text: &str,
    ) -> Result<Arc<CompileInfo>, CacheKeyError> {
        let key = CacheKey::new(space, note, block)?;
        let ticket = self.begin(&key);
        let info = Arc::new(self.compiler(space).compile(text));
        self.commit(ticket, Arc::clone(&info));
        Ok(info)
    }

    /// Register a compile call for `key` and return its ticket.
    pub fn begin(&mut self, key: &CacheKey) -> Ticket {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.space_entry(&key.space)
            .notes
            .entry(key.note.clone())
            .or_default()
            .entry(key.block.clone())
            .or_default()
            .latest = sequence;
        Ticket {
            key: key.clone(),
            sequence,
        }
    }

    /// Store `info` for the ticket's block unless a later call for the block has begun or
    /// the block was pruned meanwhile. Returns whether it was stored.
    pub fn commit(&mut self, ticket: Ticket, info: Arc<CompileInfo>) -> bool {
        let Some(entry) = self
            .spaces
            .get_mut(&ticket.key.space)
            .and_then(|space| space.notes.get_mut(&ticket.key.note))
            .and_then(|note| note.get_mut(&ticket.key.block))
        else {
            debug!(block = ticket.key.block, "discarding result for pruned block");
            return false;
        };
        if ticket.sequence < entry.latest {
            debug!(
                block = ticket.key.block,
                sequence = ticket.sequence,
                "discarding stale result"
            );
            return false;
        }
        entry.info = Some(info);
        true
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompileInfo>> {
        self.spaces
            .get(&key.space)?
            .notes
            .get(&key.note)?
            .get(&key.block)?
            .info
            .clone()
    }

    /// Drop the blocks of `note` that are not in `live`. Notes are looked up in every space.
    pub fn prune_blocks<S: AsRef<str>>(&mut self, note: &str, live: &[S]) {
        let live: HashSet<&str> = live.iter().map(AsRef::as_ref).collect();
        for space in self.spaces.values_mut() {
            if let Some(blocks) = space.notes.get_mut(note) {
                let before = blocks.len();
                blocks.retain(|block, _| live.contains(block.as_str()));
                debug!(note, removed = before - blocks.len(), "pruned blocks");
            }
        }
    }

    /// Drop the notes of `space` that are not in `live`.
    pub fn prune_notes<S: AsRef<str>>(&mut self, space: &str, live: &[S]) {
        let live: HashSet<&str> = live.iter().map(AsRef::as_ref).collect();
        if let Some(entry) = self.spaces.get_mut(space) {
            let before = entry.notes.len();
            entry.notes.retain(|note, _| live.contains(note.as_str()));
            debug!(space, removed = before - entry.notes.len(), "pruned notes");
        }
    }

    /// Drop spaces not in `live`, compilers included.
    pub fn prune_spaces<S: AsRef<str>>(&mut self, live: &[S]) {
        let live: HashSet<&str> = live.iter().map(AsRef::as_ref).collect();
        let before = self.spaces.len();
        self.spaces.retain(|space, _| live.contains(space.as_str()));
        debug!(removed = before - self.spaces.len(), "pruned spaces");
    }

    pub fn space_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.spaces.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn note_ids(&self, space: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .spaces
            .get(space)
            .map(|entry| entry.notes.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Ids of the blocks cached under `note`, in any space.
    pub fn block_ids(&self, note: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .spaces
            .values()
            .filter_map(|entry| entry.notes.get(note))
            .flat_map(|blocks| blocks.keys().map(String::as_str))
            .collect();
        ids.sort_unstable();
        ids
    }
}
