/// A row of tabs with exactly one active entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSet {
    tabs: Vec<String>,
    active: usize,
}

impl TabSet {
    /// The first tab starts active. Returns `None` for an empty row.
    pub fn new<I, S>(tabs: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tabs: Vec<String> = tabs.into_iter().map(Into::into).collect();
        if tabs.is_empty() {
            return None;
        }
        Some(Self { tabs, active: 0 })
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn active(&self) -> &str {
        &self.tabs[self.active]
    }

    pub fn is_active(&self, tab: &str) -> bool {
        self.active() == tab
    }

    /// Unknown tabs are ignored; returns whether the selection applied.
    pub fn select(&mut self, tab: &str) -> bool {
        match self.tabs.iter().position(|t| t == tab) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Re-activates `default` (or the first tab) after the content changed.
    pub fn reset(&mut self, default: &str) {
        if !self.select(default) {
            self.active = 0;
        }
    }
}
