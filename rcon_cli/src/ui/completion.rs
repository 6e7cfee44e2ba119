use rcon_core::Console;

/// Static suggestion tree for one remote command family. Used for
/// completion only; nothing is validated against the server.
#[derive(Debug, Clone, Copy)]
pub struct CompletionTree {
    pub root: &'static str,
    pub branches: &'static [(&'static str, &'static [&'static str])],
}

/// SourceMod's `sm` console commands.
pub const SOURCEMOD: CompletionTree = CompletionTree {
    root: "sm",
    branches: &[
        ("cmds", &[]),
        ("config", &[]),
        ("credits", &[]),
        ("cvars", &[]),
        ("exts", &["info", "list", "load", "reload", "unload"]),
        (
            "plugins",
            &[
                "info",
                "list",
                "load",
                "reload",
                "load_lock",
                "load_unlock",
                "unload",
                "unload_all",
                "refresh",
            ],
        ),
        ("profiler", &["flush", "report", "clear"]),
        ("version", &[]),
    ],
};

impl CompletionTree {
    /// Suggestions for the token after `preceding`, chosen purely by how many
    /// tokens come before the cursor.
    pub fn suggest(&self, preceding: &[&str], partial: &str) -> Vec<String> {
        match preceding {
            [root] if *root == self.root => {
                prefixed(self.branches.iter().map(|(segment, _)| *segment), partial)
            }
            [root, segment] if *root == self.root => self
                .branches
                .iter()
                .find(|(name, _)| name == segment)
                .map(|(_, children)| prefixed(children.iter().copied(), partial))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

/// Snapshot of the state completion needs, refreshed before every prompt.
#[derive(Debug, Clone, Default)]
pub struct CompletionContext {
    pub favorites: Vec<String>,
    pub remote: Vec<String>,
    pub connected: bool,
}

impl CompletionContext {
    pub fn capture(console: &Console) -> Self {
        Self {
            favorites: console.favorites().aliases().map(str::to_string).collect(),
            remote: console.cache().names().to_vec(),
            connected: console.is_connected(),
        }
    }
}

/// The line up to the cursor, split into finished tokens and the one being typed.
#[derive(Debug, PartialEq, Eq)]
pub struct Cursor<'a> {
    pub preceding: Vec<&'a str>,
    pub partial: &'a str,
    /// Byte offset where `partial` starts; completions replace from here.
    pub start: usize,
}

pub fn split_at_cursor(line: &str, pos: usize) -> Cursor<'_> {
    let head = line.get(..pos).unwrap_or(line);
    let start = head
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    Cursor {
        preceding: head[..start].split_whitespace().collect(),
        partial: &head[start..],
        start,
    }
}

pub fn prefixed<'a>(candidates: impl IntoIterator<Item = &'a str>, partial: &str) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(partial))
        .map(str::to_string)
        .collect()
}
