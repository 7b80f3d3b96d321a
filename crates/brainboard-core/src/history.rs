//! Command log for undo/redo.
//!
//! Every undoable store mutation is described by a [`Command`] that knows how to
//! re-apply and revert itself. The [`History`] keeps the applied log and a redo
//! stack; recording a new command invalidates the redo stack.

use crate::attrs::Attrs;
use crate::elements::{Connector, Element, ElementId, ElementTrait, Stroke};
use crate::store::{ElementStore, Removed};
use serde::{Deserialize, Serialize};

/// A recorded, reversible mutation of the element store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    AddElement {
        element: Element,
        /// The element became the selection when it was added.
        #[serde(default)]
        select: bool,
    },
    /// Attribute snapshots taken when the gesture ended.
    UpdateElement {
        id: ElementId,
        prev: Attrs,
        next: Attrs,
    },
    DeleteElement {
        removed: Removed,
    },
    AddStroke {
        stroke: Stroke,
    },
    DeleteStroke {
        index: usize,
        stroke: Stroke,
    },
    AddConnector {
        connector: Connector,
    },
    /// Holds the full connector as it was at deletion time.
    DeleteConnector {
        connector: Connector,
        z_index: usize,
    },
    UpdateConnector {
        prev: Connector,
        next: Connector,
    },
    Reorder {
        prev: Vec<ElementId>,
        next: Vec<ElementId>,
    },
    /// Several commands undone and redone as one step.
    Batch {
        commands: Vec<Command>,
    },
}

impl Command {
    /// Describe a deletion performed by [`ElementStore::delete_element`].
    pub fn deleted(removed: Removed) -> Self {
        match removed.element {
            Element::Connector(connector) => Command::DeleteConnector {
                connector,
                z_index: removed.z_index,
            },
            Element::Stroke(stroke) => Command::DeleteStroke {
                index: removed.z_index,
                stroke,
            },
            _ => Command::DeleteElement { removed },
        }
    }

    /// Short name used in log output.
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddElement { .. } => "add-element",
            Command::UpdateElement { .. } => "update-element",
            Command::DeleteElement { .. } => "delete-element",
            Command::AddStroke { .. } => "add-stroke",
            Command::DeleteStroke { .. } => "delete-stroke",
            Command::AddConnector { .. } => "add-connector",
            Command::DeleteConnector { .. } => "delete-connector",
            Command::UpdateConnector { .. } => "update-connector",
            Command::Reorder { .. } => "reorder",
            Command::Batch { .. } => "batch",
        }
    }

    /// Apply the forward effect (redo).
    pub fn apply(&self, store: &mut ElementStore) {
        match self {
            Command::AddElement { element, select } => {
                let id = store.add_element(element.clone());
                if *select {
                    store.select([id]);
                }
            }
            Command::UpdateElement { id, next, .. } => {
                store.update_element(*id, next);
            }
            Command::DeleteElement { removed } => {
                store.delete_element(removed.element.id());
            }
            Command::AddStroke { stroke } => {
                store.add_stroke(stroke.clone());
            }
            Command::DeleteStroke { index, stroke } => {
                remove_stroke(store, *index, stroke);
            }
            Command::AddConnector { connector } => {
                store.add_connector(connector.clone());
            }
            Command::DeleteConnector { connector, .. } => {
                store.delete_element(connector.id());
            }
            Command::UpdateConnector { next, .. } => {
                store.set_connector(next.clone());
            }
            Command::Reorder { next, .. } => {
                store.reorder(next);
            }
            Command::Batch { commands } => {
                for command in commands {
                    command.apply(store);
                }
            }
        }
    }

    /// Apply the inverse effect (undo).
    pub fn revert(&self, store: &mut ElementStore) {
        match self {
            Command::AddElement { element, .. } => {
                store.delete_element(element.id());
            }
            Command::UpdateElement { id, prev, .. } => {
                store.update_element(*id, prev);
            }
            Command::DeleteElement { removed } => store.restore(removed.clone()),
            Command::AddStroke { stroke } => {
                let last = store.strokes().len().checked_sub(1);
                match last.filter(|&i| store.strokes()[i].id() == stroke.id()) {
                    Some(index) => {
                        store.remove_stroke(index);
                    }
                    None => {
                        if let Some(index) = store.stroke_index(stroke.id()) {
                            store.remove_stroke(index);
                        }
                    }
                }
            }
            Command::DeleteStroke { index, stroke } => store.insert_stroke(*index, stroke.clone()),
            Command::AddConnector { connector } => {
                store.delete_element(connector.id());
            }
            Command::DeleteConnector { connector, z_index } => store.restore(Removed {
                element: Element::Connector(connector.clone()),
                z_index: *z_index,
                severed: Vec::new(),
            }),
            Command::UpdateConnector { prev, .. } => {
                store.set_connector(prev.clone());
            }
            Command::Reorder { prev, .. } => {
                store.reorder(prev);
            }
            Command::Batch { commands } => {
                for command in commands.iter().rev() {
                    command.revert(store);
                }
            }
        }
    }
}

/// Remove the stroke at `index`, falling back to an id lookup if the index went stale.
fn remove_stroke(store: &mut ElementStore, index: usize, stroke: &Stroke) {
    let at_index = store
        .strokes()
        .get(index)
        .is_some_and(|s| s.id() == stroke.id());
    let index = if at_index {
        Some(index)
    } else {
        store.stroke_index(stroke.id())
    };
    if let Some(index) = index {
        store.remove_stroke(index);
    }
}

/// Applied commands plus the stack of undone ones.
#[derive(Debug, Clone, Default)]
pub struct History {
    log: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command whose effect has already been applied, clearing the redo stack.
    pub fn record(&mut self, command: Command) {
        if matches!(&command, Command::Batch { commands } if commands.is_empty()) {
            return;
        }
        log::debug!("Recorded {}", command.label());
        self.log.push(command);
        self.redo_stack.clear();
    }

    /// Revert the most recent command. Returns false if there was nothing to undo.
    pub fn undo(&mut self, store: &mut ElementStore) -> bool {
        let Some(command) = self.log.pop() else {
            return false;
        };
        log::debug!("Undo {}", command.label());
        command.revert(store);
        self.redo_stack.push(command);
        true
    }

    /// Re-apply the most recently undone command. Returns false if there was nothing to redo.
    pub fn redo(&mut self, store: &mut ElementStore) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("Redo {}", command.label());
        command.apply(store);
        self.log.push(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Applied commands, oldest first.
    pub fn entries(&self) -> &[Command] {
        &self.log
    }

    /// Undone commands, most recently undone last.
    pub fn redo_entries(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Everything ever recorded on the current branch, oldest first.
    pub fn full_history(&self) -> Vec<&Command> {
        self.log.iter().chain(self.redo_stack.iter().rev()).collect()
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.redo_stack.clear();
    }
}
