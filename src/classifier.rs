use lazy_static::lazy_static;
use std::collections::HashMap;

/// Destination category for a file, keyed off its extension.
///
/// `as_str` values double as the destination directory names, so they
/// are load-bearing: renaming a variant reshuffles the organized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Documents,
    Images,
    Music,
    ExecutableWindowsSoftware,
    ExecutableMac,
    ExecutableLinux,
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Documents => "Documents",
            Category::Images => "Images",
            Category::Music => "Music",
            Category::ExecutableWindowsSoftware => "ExecutableWindowsSoftware",
            Category::ExecutableMac => "ExecutableMac",
            Category::ExecutableLinux => "ExecutableLinux",
            Category::Others => "Others",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref CATEGORY_MAP: HashMap<&'static str, Category> = {
        let mut m = HashMap::new();
        for ext in ["pdf", "doc", "docx", "xls", "xlsx", "txt"] {
            m.insert(ext, Category::Documents);
        }
        for ext in ["jpg", "jpeg", "png", "gif"] {
            m.insert(ext, Category::Images);
        }
        for ext in ["mp3", "wav", "flac"] {
            m.insert(ext, Category::Music);
        }
        for ext in ["exe", "msi"] {
            m.insert(ext, Category::ExecutableWindowsSoftware);
        }
        for ext in ["dmg", "pkg", "app"] {
            m.insert(ext, Category::ExecutableMac);
        }
        for ext in ["sh", "deb", "rpm"] {
            m.insert(ext, Category::ExecutableLinux);
        }
        m
    };
}

/// Map a file name to its category by extension (case-insensitive).
/// Total function: no extension, or one not in the table, is `Others`.
pub fn classify(file_name: &str) -> Category {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            CATEGORY_MAP
                .get(ext.as_str())
                .copied()
                .unwrap_or(Category::Others)
        }
        _ => Category::Others,
    }
}
