//! State machine extraction from `x-protocol` metadata.
//!
//! The extracted model mirrors the schema: nothing checks that transition
//! endpoints or the initial state are declared. Callers that want that
//! check run [`StateMachine::validate`].

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ParseError;
use crate::report::DocumentSection;
use crate::schema::ProtocolMetadata;

const DEFAULT_NAME: &str = "State Machine";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub name: String,
    pub description: String,
    pub is_terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from_state: String,
    pub to_state: String,
    pub trigger: String,
    pub condition: Option<String>,
    pub action: Option<String>,
    pub spec_reference_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMachine {
    pub name: String,
    pub initial_state: String,
    pub states: Vec<State>,
    pub transitions: Vec<Transition>,
    pub description: Option<String>,
}

impl StateMachine {
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Check that the initial state and every transition endpoint are declared.
    ///
    /// Returns the first dangling reference found.
    pub fn validate(&self) -> Result<(), ParseError> {
        let declared: HashSet<&str> = self.states.iter().map(|s| s.name.as_str()).collect();

        if !self.initial_state.is_empty() && !declared.contains(self.initial_state.as_str()) {
            return Err(ParseError::UnresolvedState {
                state: self.initial_state.clone(),
                context: "initial_state".to_string(),
            });
        }

        for (index, t) in self.transitions.iter().enumerate() {
            for endpoint in [&t.from_state, &t.to_state] {
                if !declared.contains(endpoint.as_str()) {
                    return Err(ParseError::UnresolvedState {
                        state: endpoint.clone(),
                        context: format!(
                            "transition {} '{} --[{}]--> {}'",
                            index, t.from_state, t.trigger, t.to_state
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Build the state machine described in `x-protocol.state_machine`.
///
/// Returns `None` when there is no protocol metadata, no state machine in it,
/// or the state machine block is empty.
pub fn extract_state_machine(protocol: Option<&ProtocolMetadata>) -> Option<StateMachine> {
    let protocol = protocol?;
    let spec = protocol.state_machine.as_ref()?;
    if spec.initial_state.is_empty() && spec.states.is_empty() && spec.transitions.is_empty() {
        return None;
    }

    let states = spec
        .states
        .iter()
        .map(|s| State {
            name: s.name.clone(),
            description: s.description.clone(),
            is_terminal: s.is_terminal,
        })
        .collect();

    let transitions = spec
        .transitions
        .iter()
        .map(|t| Transition {
            from_state: t.from_state.clone(),
            to_state: t.to_state.clone(),
            trigger: t.trigger.clone(),
            condition: t.condition.clone(),
            action: t.action.clone(),
            spec_reference_note: t.spec_ref.clone(),
        })
        .collect();

    Some(StateMachine {
        name: protocol
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        initial_state: spec.initial_state.clone(),
        states,
        transitions,
        description: protocol.description.clone(),
    })
}

/// Two-column {State, Description} table
pub fn generate_state_table(sm: &StateMachine) -> DocumentSection {
    let rows = sm
        .states
        .iter()
        .map(|state| {
            let marker = if state.is_terminal { " (terminal)" } else { "" };
            vec![state.name.clone(), format!("{}{}", state.description, marker)]
        })
        .collect();

    DocumentSection::Table {
        title: format!("{} States", sm.name),
        headers: vec!["State".to_string(), "Description".to_string()],
        rows,
    }
}

/// Five-column {From, To, Trigger, Condition, Action} table
pub fn generate_transition_table(sm: &StateMachine) -> DocumentSection {
    let rows = sm
        .transitions
        .iter()
        .map(|t| {
            vec![
                t.from_state.clone(),
                t.to_state.clone(),
                t.trigger.clone(),
                dash_if_empty(t.condition.as_deref()),
                dash_if_empty(t.action.as_deref()),
            ]
        })
        .collect();

    DocumentSection::Table {
        title: format!("{} Transitions", sm.name),
        headers: ["From", "To", "Trigger", "Condition", "Action"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    }
}

fn dash_if_empty(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => "-".to_string(),
    }
}

/// Plain-text listing of the transitions. Empty when no states are declared.
pub fn generate_transition_diagram(sm: &StateMachine) -> String {
    if sm.states.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        format!("State Machine: {}", sm.name),
        format!("Initial State: {}", sm.initial_state),
        String::new(),
    ];

    for t in &sm.transitions {
        lines.push(format!("  {} --[{}]--> {}", t.from_state, t.trigger, t.to_state));
    }

    lines.join("\n")
}

/// State table, transition table and diagram for a protocol's state machine.
///
/// A non-empty `title` replaces the machine name in the section titles.
pub fn generate_state_machine_section(
    protocol: Option<&ProtocolMetadata>,
    title: &str,
) -> Vec<DocumentSection> {
    let Some(sm) = extract_state_machine(protocol) else {
        return Vec::new();
    };

    let mut state_table = generate_state_table(&sm);
    let mut transition_table = generate_transition_table(&sm);
    if !title.is_empty() {
        state_table.set_title(format!("{} States", title));
        transition_table.set_title(format!("{} Transitions", title));
    }

    let mut sections = vec![state_table, transition_table];

    let diagram = generate_transition_diagram(&sm);
    if !diagram.is_empty() {
        let label = if title.is_empty() { sm.name.as_str() } else { title };
        sections.push(DocumentSection::code_block(format!("{} Diagram", label), diagram));
    }

    sections
}
