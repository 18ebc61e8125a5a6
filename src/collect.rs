//! Ready-made visitors.

use crate::tag::Attributes;
use crate::traverse::Visitor;
use serde::Serialize;
use std::collections::BTreeMap;

/// One visitor callback, as recorded by [`EventCollector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Enter {
        name: String,
        attributes: BTreeMap<String, String>,
    },
    Leave {
        name: String,
    },
    /// `name` is `None` for text outside of any element.
    Data {
        name: Option<String>,
        text: String,
    },
}

impl Event {
    pub fn enter(name: &str, attributes: &[(&str, &str)]) -> Self {
        Event::Enter {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn leave(name: &str) -> Self {
        Event::Leave {
            name: name.to_string(),
        }
    }

    pub fn data(name: &str, text: &str) -> Self {
        Event::Data {
            name: Some(name.to_string()),
            text: text.to_string(),
        }
    }

    pub fn root_data(text: &str) -> Self {
        Event::Data {
            name: None,
            text: text.to_string(),
        }
    }
}

/// Records every callback, optionally asking the traversal to stop after a
/// fixed number of them.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
    limit: Option<usize>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `n`-th recorded callback returns `false`.
    pub fn stop_after(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    fn record(&mut self, event: Event) -> bool {
        self.events.push(event);
        self.limit.map_or(true, |n| self.events.len() < n)
    }
}

impl Visitor for EventCollector {
    fn enter(&mut self, name: &str, attributes: &Attributes) -> bool {
        self.record(Event::Enter {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    fn leave(&mut self, name: &str) -> bool {
        self.record(Event::leave(name))
    }

    fn data(&mut self, name: &str, text: &str) -> bool {
        self.record(Event::data(name, text))
    }

    fn root_data(&mut self, text: &str) -> bool {
        self.record(Event::root_data(text))
    }
}

/// Document shape counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub elements: usize,
    pub attributes: usize,
    pub data_sections: usize,
    pub data_bytes: usize,
    pub max_depth: usize,
    #[serde(skip)]
    depth: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    fn count_data(&mut self, text: &str) {
        self.data_sections += 1;
        self.data_bytes += text.len();
    }
}

impl Visitor for Stats {
    fn enter(&mut self, _name: &str, attributes: &Attributes) -> bool {
        self.elements += 1;
        self.attributes += attributes.len();
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        true
    }

    fn leave(&mut self, _name: &str) -> bool {
        self.depth = self.depth.saturating_sub(1);
        true
    }

    fn data(&mut self, _name: &str, text: &str) -> bool {
        self.count_data(text);
        true
    }

    fn root_data(&mut self, text: &str) -> bool {
        self.count_data(text);
        true
    }
}
