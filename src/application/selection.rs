//! Checkbox selection with shift-click range semantics.

/// Selected keys in the order they were checked, plus the anchor of the
/// last explicit click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: Vec<String>,
    anchor: Option<String>,
}

impl Selection {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|selected| selected == key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.keys.clone()
    }

    /// Applies a checkbox click on `key`.
    ///
    /// With `extend` set and an anchor present in `visible`, every key between
    /// the anchor and `key` (inclusive, in `visible` order) takes the new
    /// checked state. Otherwise only `key` changes. The anchor always moves
    /// to `key`.
    pub fn toggle<S: AsRef<str>>(&mut self, key: &str, checked: bool, extend: bool, visible: &[S]) {
        let range = if extend {
            self.anchor
                .as_deref()
                .and_then(|anchor| position(visible, anchor))
                .zip(position(visible, key))
                .map(|(a, b)| (a.min(b), a.max(b)))
        } else {
            None
        };

        match range {
            Some((start, end)) => {
                for item in &visible[start..=end] {
                    self.set(item.as_ref(), checked);
                }
            }
            None => self.set(key, checked),
        }
        self.anchor = Some(key.to_string());
    }

    /// Select-all / clear-all over the visible keys only; hidden keys keep
    /// their state.
    pub fn set_all<S: AsRef<str>>(&mut self, checked: bool, visible: &[S]) {
        for key in visible {
            self.set(key.as_ref(), checked);
        }
        self.anchor = None;
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.anchor = None;
    }

    /// Checking an already selected key keeps its original position.
    fn set(&mut self, key: &str, checked: bool) {
        if checked {
            if !self.contains(key) {
                self.keys.push(key.to_string());
            }
        } else {
            self.keys.retain(|selected| selected != key);
        }
    }
}

fn position<S: AsRef<str>>(visible: &[S], key: &str) -> Option<usize> {
    visible.iter().position(|item| item.as_ref() == key)
}
