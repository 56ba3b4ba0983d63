use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A locale code such as `en_GB` or `de_DE`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Creates a language from its locale code.
    ///
    /// Surrounding whitespace is stripped; the code is otherwise kept verbatim.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Request-scoped holder of the language callers mean when they name none.
///
/// Clones share the same cell, so a proxy created before the language
/// changes still observes the new value.
#[derive(Clone, Debug)]
pub struct DefaultLanguage {
    current: Rc<RefCell<Language>>,
}

impl DefaultLanguage {
    #[must_use]
    pub fn new(language: Language) -> Self {
        Self {
            current: Rc::new(RefCell::new(language)),
        }
    }

    pub fn get(&self) -> Language {
        self.current.borrow().clone()
    }

    pub fn set(&self, language: Language) {
        *self.current.borrow_mut() = language;
    }
}
