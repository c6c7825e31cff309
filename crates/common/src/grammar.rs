//! Command grammar table
//!
//! The static registry of recognised `cy.*` commands. A command is
//! implemented when it carries an output template; every other entry is
//! known but yields a "not implemented yet" warning.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::parser::first_quoted_literal;

/// Arguments handed to an output template
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// The raw input line as typed
    pub input: &'a str,
    /// Text between the opening paren and its matching close
    pub args_text: &'a str,
}

/// Renders the simulated output of an implemented command
pub type OutputTemplate = fn(&Invocation<'_>) -> String;

/// One entry of the grammar table
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Reference invocation shown in help, e.g. `cy.log(message)`
    pub example: &'static str,
    pub description: &'static str,
    /// Listed in the help catalog
    pub in_help: bool,
    pub template: Option<OutputTemplate>,
}

/// Serializable view of a [`CommandSpec`]
#[derive(Debug, Clone, Serialize)]
pub struct CommandSummary {
    pub name: &'static str,
    pub example: &'static str,
    pub description: &'static str,
    pub implemented: bool,
}

impl CommandSpec {
    const fn known(name: &'static str, example: &'static str, description: &'static str) -> Self {
        Self {
            name,
            example,
            description,
            in_help: false,
            template: None,
        }
    }

    const fn listed(self) -> Self {
        Self { in_help: true, ..self }
    }

    const fn with_template(self, template: OutputTemplate) -> Self {
        Self {
            template: Some(template),
            ..self
        }
    }

    pub fn implemented(&self) -> bool {
        self.template.is_some()
    }

    pub fn summary(&self) -> CommandSummary {
        CommandSummary {
            name: self.name,
            example: self.example,
            description: self.description,
            implemented: self.implemented(),
        }
    }
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("example", &self.example)
            .field("implemented", &self.implemented())
            .finish()
    }
}

fn log_template(inv: &Invocation<'_>) -> String {
    let message = first_quoted_literal(inv.args_text).unwrap_or_else(|| inv.args_text.trim());
    format!("{} // Logged message \"{}\"", inv.input, message)
}

// Order is the help catalog order.
static BUILTIN_COMMANDS: &[CommandSpec] = &[
    CommandSpec::known("cy.log", "cy.log(message)", "Prints a message to the Cypress Command Log.")
        .listed()
        .with_template(log_template),
    CommandSpec::known("cy.visit", "cy.visit(url)", "Visits a given URL.").listed(),
    CommandSpec::known("cy.get", "cy.get(selector)", "Gets one or more DOM elements by selector or alias.")
        .listed(),
    CommandSpec::known("cy.contains", "cy.contains(content)", "Gets the DOM element containing the text.")
        .listed(),
    CommandSpec::known("cy.request", "cy.request(url)", "Makes an HTTP request.").listed(),
    CommandSpec::known("cy.intercept", "cy.intercept(method, url)", "Spies and stubs network requests and responses.")
        .listed(),
    CommandSpec::known("cy.wait", "cy.wait(ms)", "Waits for a number of milliseconds or for an aliased resource.")
        .listed(),
    CommandSpec::known("cy.reload", "cy.reload()", "Reloads the page.").listed(),
    CommandSpec::known("cy.fixture", "cy.fixture(filePath)", "Loads a fixed set of data located in a file."),
    CommandSpec::known("cy.go", "cy.go(direction)", "Navigates back or forward in the browser history."),
    CommandSpec::known("cy.url", "cy.url()", "Gets the URL of the active page."),
    CommandSpec::known("cy.title", "cy.title()", "Gets the document title of the active page."),
    CommandSpec::known("cy.location", "cy.location()", "Gets the window.location object of the active page."),
    CommandSpec::known("cy.hash", "cy.hash()", "Gets the URL hash of the active page."),
    CommandSpec::known("cy.window", "cy.window()", "Gets the window object of the active page."),
    CommandSpec::known("cy.document", "cy.document()", "Gets the window.document of the active page."),
    CommandSpec::known("cy.viewport", "cy.viewport(width, height)", "Controls the size and orientation of the screen."),
    CommandSpec::known("cy.screenshot", "cy.screenshot()", "Takes a screenshot of the application under test."),
    CommandSpec::known("cy.wrap", "cy.wrap(subject)", "Yields the object passed into it."),
    CommandSpec::known("cy.focused", "cy.focused()", "Gets the DOM element that is currently focused."),
    CommandSpec::known("cy.root", "cy.root()", "Gets the root DOM element."),
    CommandSpec::known("cy.exec", "cy.exec(command)", "Executes a system command."),
    CommandSpec::known("cy.task", "cy.task(event)", "Executes code in Node via the task plugin event."),
    CommandSpec::known("cy.readFile", "cy.readFile(filePath)", "Reads a file and yields its contents."),
    CommandSpec::known("cy.writeFile", "cy.writeFile(filePath, contents)", "Writes to a file with the specified contents."),
    CommandSpec::known("cy.session", "cy.session(id, setup)", "Caches and restores cookies and storage between tests."),
    CommandSpec::known("cy.origin", "cy.origin(url, callback)", "Visits multiple domains of different origin in a single test."),
    CommandSpec::known("cy.clearCookie", "cy.clearCookie(name)", "Clears a specific browser cookie."),
    CommandSpec::known("cy.clearCookies", "cy.clearCookies()", "Clears browser cookies for a domain."),
    CommandSpec::known("cy.clearAllCookies", "cy.clearAllCookies()", "Clears browser cookies for all domains."),
    CommandSpec::known("cy.getCookie", "cy.getCookie(name)", "Gets a browser cookie by its name."),
    CommandSpec::known("cy.getCookies", "cy.getCookies()", "Gets browser cookies for the current domain."),
    CommandSpec::known("cy.getAllCookies", "cy.getAllCookies()", "Gets all browser cookies."),
    CommandSpec::known("cy.setCookie", "cy.setCookie(name, value)", "Sets a browser cookie."),
    CommandSpec::known("cy.clearLocalStorage", "cy.clearLocalStorage()", "Clears local storage for the current origin."),
    CommandSpec::known("cy.clearAllLocalStorage", "cy.clearAllLocalStorage()", "Clears local storage for all origins."),
    CommandSpec::known("cy.clearAllSessionStorage", "cy.clearAllSessionStorage()", "Clears session storage for all origins."),
    CommandSpec::known("cy.getAllLocalStorage", "cy.getAllLocalStorage()", "Gets local storage for all origins."),
    CommandSpec::known("cy.getAllSessionStorage", "cy.getAllSessionStorage()", "Gets session storage for all origins."),
    CommandSpec::known("cy.clock", "cy.clock()", "Overrides native global functions related to time."),
    CommandSpec::known("cy.tick", "cy.tick(ms)", "Moves time after overriding the clock."),
    CommandSpec::known("cy.stub", "cy.stub()", "Replaces a function and controls its behavior."),
    CommandSpec::known("cy.spy", "cy.spy()", "Wraps a method in a spy to record calls."),
    CommandSpec::known("cy.debug", "cy.debug()", "Sets a debugger and logs what the previous command yields."),
    CommandSpec::known("cy.pause", "cy.pause()", "Stops cy commands from running until resumed."),
    CommandSpec::known("cy.press", "cy.press(key)", "Triggers native key events as if a user pressed them."),
];

/// Immutable command registry with exact, case-sensitive lookup
pub struct GrammarTable {
    specs: &'static [CommandSpec],
    index: HashMap<&'static str, usize>,
}

static BUILTIN: Lazy<GrammarTable> = Lazy::new(|| GrammarTable::new(BUILTIN_COMMANDS));

impl GrammarTable {
    /// Build a table over a static list. Later duplicates are ignored.
    pub fn new(specs: &'static [CommandSpec]) -> Self {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.contains_key(spec.name) {
                tracing::warn!(name = spec.name, "duplicate command in grammar table");
                continue;
            }
            index.insert(spec.name, i);
        }
        Self { specs, index }
    }

    /// The process-wide table of built-in commands
    pub fn builtin() -> &'static GrammarTable {
        &BUILTIN
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All entries, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }

    pub fn implemented(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter().filter(|s| s.implemented())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
