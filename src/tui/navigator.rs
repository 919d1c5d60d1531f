//! Page registry: at most one live page per id, exactly one visible page
//! while any are registered.

use indexmap::IndexMap;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Home,
    Settings,
    AddProject,
    AddToken,
    Pipelines,
    Jobs,
    Log,
    Workflows,
    WorkflowJobs,
    Steps,
}

impl PageId {
    /// Fixed parent in the page hierarchy; `None` for root pages.
    pub fn parent(self) -> Option<PageId> {
        match self {
            PageId::Home | PageId::Workflows => None,
            PageId::Settings | PageId::Pipelines => Some(PageId::Home),
            PageId::AddProject | PageId::AddToken => Some(PageId::Settings),
            PageId::Jobs => Some(PageId::Pipelines),
            PageId::Log => Some(PageId::Jobs),
            PageId::WorkflowJobs => Some(PageId::Workflows),
            PageId::Steps => Some(PageId::WorkflowJobs),
        }
    }

    pub fn is_root(self) -> bool {
        self.parent().is_none()
    }

    pub fn title(self) -> &'static str {
        match self {
            PageId::Home => "Projects",
            PageId::Settings => "Settings",
            PageId::AddProject => "Add project",
            PageId::AddToken => "Add token",
            PageId::Pipelines => "Pipelines",
            PageId::Jobs => "Jobs",
            PageId::Log => "Log",
            PageId::Workflows => "Workflow runs",
            PageId::WorkflowJobs => "Workflow jobs",
            PageId::Steps => "Steps",
        }
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug)]
pub struct Navigator<V> {
    pages: IndexMap<PageId, V>,
    visible: Option<PageId>,
}

impl<V> Default for Navigator<V> {
    fn default() -> Self {
        Self {
            pages: IndexMap::new(),
            visible: None,
        }
    }
}

impl<V> Navigator<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `view` under `id` and shows it. An existing view for `id` is
    /// replaced and returned.
    pub fn push(&mut self, id: PageId, view: V) -> Option<V> {
        debug!("Navigator: push {id}");
        let old = self.pages.insert(id, view);
        self.visible = Some(id);
        old
    }

    /// Shows an already registered page. Returns `false` and changes nothing
    /// when `id` is unknown.
    pub fn switch_to(&mut self, id: PageId) -> bool {
        if !self.pages.contains_key(&id) {
            debug!("Navigator: switch to unregistered {id} ignored");
            return false;
        }
        self.visible = Some(id);
        true
    }

    /// Switches from `from` to its parent page, if that page is registered.
    pub fn back(&mut self, from: PageId) -> Option<PageId> {
        let parent = from.parent()?;
        self.switch_to(parent).then_some(parent)
    }

    /// Unregisters `id`. When it was visible, the nearest registered ancestor
    /// becomes visible, else the most recently registered page.
    pub fn remove(&mut self, id: PageId) -> Option<V> {
        let view = self.pages.shift_remove(&id)?;
        debug!("Navigator: removed {id}");

        if self.visible == Some(id) {
            let mut ancestor = id.parent();
            while let Some(candidate) = ancestor {
                if self.pages.contains_key(&candidate) {
                    break;
                }
                ancestor = candidate.parent();
            }
            self.visible = ancestor.or_else(|| self.pages.keys().last().copied());
        }
        Some(view)
    }

    pub fn visible(&self) -> Option<PageId> {
        self.visible
    }

    pub fn current(&self) -> Option<&V> {
        self.visible.and_then(|id| self.pages.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut V> {
        let id = self.visible?;
        self.pages.get_mut(&id)
    }

    pub fn get(&self, id: PageId) -> Option<&V> {
        self.pages.get(&id)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut V> {
        self.pages.get_mut(&id)
    }
}

#[cfg(test)]
impl<V> Navigator<V> {
    pub fn contains(&self, id: PageId) -> bool {
        self.pages.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
