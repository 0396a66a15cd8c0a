//! Runtime tags
//!
//! A tag names the logical type of a [`DynObject`](crate::value::DynObject)
//! and links to a base tag by uid, forming a single-rooted inheritance chain.
//! The root is the untagged cell `_`.
//!
//! Tags are registered once and live for the rest of the process, so values
//! hold them as `&'static TagInfo`. The base link is a uid, never a pointer:
//! walking the chain goes back through the registry.
//!
//! ## Strong and weak tags
//!
//! A tag whose name starts with an uppercase ASCII letter is *strong*
//! (`Float`, `String`, `List`, ...). Strong tags only accept values whose tag
//! inherits from them. Weak tags (`_`, `bool`, `char`) accept any other weak
//! tag.

use std::sync::{OnceLock, RwLock};

/// Tag identifier, stable for the lifetime of the process
pub type TagUid = i32;

pub const TAG_CELL: TagUid = 0;
pub const TAG_BOOL: TagUid = 1;
pub const TAG_CHAR: TagUid = 2;
pub const TAG_FLOAT: TagUid = 3;
pub const TAG_STRING: TagUid = 4;
pub const TAG_VARIANT: TagUid = 5;
pub const TAG_LIST: TagUid = 6;
pub const TAG_MAP: TagUid = 7;
pub const TAG_LINKED_LIST: TagUid = 8;
pub const TAG_POOL: TagUid = 9;
pub const TAG_ITER: TagUid = 10;

const BUILTIN_NAMES: [&str; 11] = [
    "_",
    "bool",
    "char",
    "Float",
    "String",
    "Variant",
    "List",
    "Map",
    "LinkedList",
    "Pool",
    "Iter",
];

/// Reference to a registered tag
pub type TagPtr = &'static TagInfo;

/// Immutable tag record
#[derive(Debug, PartialEq, Eq)]
pub struct TagInfo {
    pub uid: TagUid,
    pub name: String,
    /// Uid of the base tag; `None` only for the root
    pub base: Option<TagUid>,
}

/// Which registry a handle-carrying tag refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Variant,
    List,
    Map,
    LinkedList,
    Pool,
    Iter,
}

impl HandleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Variant => "variant",
            HandleKind::List => "list",
            HandleKind::Map => "map",
            HandleKind::LinkedList => "linked list",
            HandleKind::Pool => "pool",
            HandleKind::Iter => "iterator",
        }
    }
}

impl TagInfo {
    /// Strong tags require exact inheritance on assignment
    pub fn strong(&self) -> bool {
        self.uid != TAG_CELL && self.name.starts_with(|c: char| c.is_ascii_uppercase())
    }

    /// Base tag, resolved through the registry
    pub fn base_tag(&self) -> Option<TagPtr> {
        self.base.and_then(find_tag)
    }

    /// True if `parent` is this tag or one of its ancestors
    pub fn inherits_from(&self, parent: TagPtr) -> bool {
        self.inherits_from_uid(parent.uid)
    }

    pub fn inherits_from_uid(&self, parent: TagUid) -> bool {
        let mut current = Some(self.uid);
        while let Some(uid) = current {
            if uid == parent {
                return true;
            }
            current = find_tag(uid).and_then(|t| t.base);
        }
        false
    }

    /// Whether a value tagged `candidate` may be stored where `self` is expected
    ///
    /// A strong tag takes itself and its descendants. A weak tag takes any
    /// weak tag.
    pub fn accepts(&self, candidate: TagPtr) -> bool {
        if self.strong() {
            candidate.inherits_from_uid(self.uid)
        } else {
            !candidate.strong()
        }
    }

    /// The ancestor directly below the root (or the root itself)
    ///
    /// Two tags with the same top base share arithmetic and comparison
    /// semantics.
    pub fn find_top_base(&'static self) -> TagPtr {
        let mut tag: TagPtr = self;
        while let Some(base) = tag.base_tag() {
            if base.uid == TAG_CELL {
                break;
            }
            tag = base;
        }
        tag
    }

    pub fn same_base(&'static self, other: TagPtr) -> bool {
        std::ptr::eq(self.find_top_base(), other.find_top_base())
    }

    /// Registry a handle stored in a cell of this tag belongs to, if any
    pub fn handle_kind(&'static self) -> Option<HandleKind> {
        match self.find_top_base().uid {
            TAG_VARIANT => Some(HandleKind::Variant),
            TAG_LIST => Some(HandleKind::List),
            TAG_MAP => Some(HandleKind::Map),
            TAG_LINKED_LIST => Some(HandleKind::LinkedList),
            TAG_POOL => Some(HandleKind::Pool),
            TAG_ITER => Some(HandleKind::Iter),
            _ => None,
        }
    }

    pub fn is_float(&'static self) -> bool {
        self.find_top_base().uid == TAG_FLOAT
    }

    pub fn is_string(&'static self) -> bool {
        self.find_top_base().uid == TAG_STRING
    }
}

struct TagRegistry {
    tags: Vec<TagPtr>,
}

impl TagRegistry {
    fn new() -> Self {
        let tags = BUILTIN_NAMES
            .iter()
            .enumerate()
            .map(|(uid, name)| {
                let uid = uid as TagUid;
                let base = if uid == TAG_CELL { None } else { Some(TAG_CELL) };
                leak(TagInfo {
                    uid,
                    name: (*name).to_string(),
                    base,
                })
            })
            .collect();
        Self { tags }
    }
}

// Tags are never unregistered.
fn leak(info: TagInfo) -> TagPtr {
    Box::leak(Box::new(info))
}

static TAG_REGISTRY: OnceLock<RwLock<TagRegistry>> = OnceLock::new();

fn registry() -> &'static RwLock<TagRegistry> {
    TAG_REGISTRY.get_or_init(|| RwLock::new(TagRegistry::new()))
}

/// Look up a tag by uid
pub fn find_tag(uid: TagUid) -> Option<TagPtr> {
    let reg = registry().read().unwrap_or_else(|e| e.into_inner());
    usize::try_from(uid).ok().and_then(|i| reg.tags.get(i).copied())
}

/// Look up a tag by name
pub fn find_tag_by_name(name: &str) -> Option<TagPtr> {
    let reg = registry().read().unwrap_or_else(|e| e.into_inner());
    reg.tags.iter().copied().find(|t| t.name == name)
}

/// Built-in tag lookup
///
/// Built-ins are installed when the registry is first touched, so the
/// lookup cannot miss for the `TAG_*` constants.
pub fn builtin(uid: TagUid) -> TagPtr {
    debug_assert!((0..BUILTIN_NAMES.len() as TagUid).contains(&uid));
    let reg = registry().read().unwrap_or_else(|e| e.into_inner());
    reg.tags[uid as usize]
}

/// Register a tag, or return the existing one with the same name
///
/// A missing base defaults to the root.
pub fn register_tag(name: &str, base: Option<TagPtr>) -> TagPtr {
    if let Some(existing) = find_tag_by_name(name) {
        return existing;
    }
    let mut reg = registry().write().unwrap_or_else(|e| e.into_inner());
    // Raced with another registration of the same name
    if let Some(existing) = reg.tags.iter().copied().find(|t| t.name == name) {
        return existing;
    }
    let uid = reg.tags.len() as TagUid;
    let tag = leak(TagInfo {
        uid,
        name: name.to_string(),
        base: Some(base.map_or(TAG_CELL, |b| b.uid)),
    });
    reg.tags.push(tag);
    tag
}
