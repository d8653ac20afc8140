//! # Template Store
//!
//! Ordered, bounded collection of templates. Insertion order defines age:
//! once the capacity is exceeded the oldest inserted template is evicted,
//! regardless of how recently it was used.

use crate::error::StoreError;
use crate::model::GraphState;
use crate::template::Template;
use uuid::Uuid;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub struct TemplateStore {
    /// Oldest first.
    templates: Vec<Template>,
    capacity: usize,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            templates: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Appends `template` as the newest entry and returns its id.
    ///
    /// Dangling edges are pruned first. Re-adding an existing id replaces
    /// that entry and moves it to the newest position.
    pub fn add(&mut self, mut template: Template) -> String {
        template.prune_dangling_edges();
        self.templates.retain(|t| t.id != template.id);
        let id = template.id.clone();
        self.templates.push(template);
        self.enforce_capacity();
        id
    }

    /// Saves every selected node of `graph`, plus the edges between them.
    pub fn save_selection(
        &mut self,
        graph: &GraphState,
        name: &str,
        description: &str,
        category: &str,
        tags: Vec<String>,
    ) -> Result<String, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let selected: Vec<Uuid> = graph.selected_nodes().iter().map(|n| n.uuid).collect();
        if selected.is_empty() {
            return Err(StoreError::EmptySelection);
        }

        let mut template = Template::from_graph(name, graph, &selected);
        template.description = description.to_string();
        template.category = category.to_string();
        template.tags = tags;

        tracing::info!(
            template_id = %template.id,
            nodes = template.nodes.len(),
            edges = template.edges.len(),
            "Saved selection as template"
        );
        Ok(self.add(template))
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Template> {
        self.templates.iter_mut().find(|t| t.id == id)
    }

    /// All templates, oldest first.
    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let template = self.require_mut(id)?;
        template.name = name.to_string();
        template.touch();
        Ok(())
    }

    pub fn update_category(&mut self, id: &str, category: &str) -> Result<(), StoreError> {
        let template = self.require_mut(id)?;
        template.category = category.to_string();
        template.touch();
        Ok(())
    }

    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> Result<(), StoreError> {
        let template = self.require_mut(id)?;
        template.tags = tags;
        template.touch();
        Ok(())
    }

    /// Copies a template under a new id as the newest entry.
    pub fn duplicate(&mut self, id: &str) -> Result<String, StoreError> {
        let source = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut copy = Template::new(format!("{} (copy)", source.name));
        copy.description = source.description.clone();
        copy.category = source.category.clone();
        copy.tags = source.tags.clone();
        copy.nodes = source.nodes.clone();
        copy.edges = source.edges.clone();
        Ok(self.add(copy))
    }

    pub fn delete(&mut self, id: &str) -> Result<Template, StoreError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.templates.remove(index))
    }

    pub fn by_category(&self, category: &str) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Case-insensitive match on name, description or tags.
    pub fn search(&self, query: &str) -> Vec<&Template> {
        let query = query.trim();
        if query.is_empty() {
            return self.templates.iter().collect();
        }
        self.templates.iter().filter(|t| t.matches(query)).collect()
    }

    /// Distinct non-empty categories, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for template in &self.templates {
            let category = template.category.as_str();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }

    /// Counts one insertion of `id`.
    pub fn record_usage(&mut self, id: &str) -> Result<(), StoreError> {
        self.require_mut(id)?.record_usage();
        Ok(())
    }

    /// Replaces the whole content, oldest first, then applies the capacity.
    pub(crate) fn replace_all(&mut self, templates: Vec<Template>) {
        self.templates.clear();
        for template in templates {
            self.add(template);
        }
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Template, StoreError> {
        self.get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn enforce_capacity(&mut self) {
        while self.templates.len() > self.capacity {
            let evicted = self.templates.remove(0);
            tracing::info!(
                template_id = %evicted.id,
                name = %evicted.name,
                "Evicted oldest template"
            );
        }
    }
}
