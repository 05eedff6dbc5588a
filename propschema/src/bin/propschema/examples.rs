use crate::commands::{check, indexes, list, schema};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "list",
            groups: list::EXAMPLES,
        },
        CommandExample {
            name: "schema",
            groups: schema::EXAMPLES,
        },
        CommandExample {
            name: "indexes",
            groups: indexes::EXAMPLES,
        },
        CommandExample {
            name: "check",
            groups: check::EXAMPLES,
        },
    ]
}
