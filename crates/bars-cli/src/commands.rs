//! Parsing of shell input lines into commands.

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Exit,
    Help,
    Stats,
    Projects,
    Clear,
    Rescan,
    Remember(String),
    Model(String),
    Run {
        project: String,
        file: String,
        args: Vec<String>,
    },
    /// A command given without its required arguments.
    Usage(&'static str),
    /// Anything that is not a command goes to the model.
    Chat(String),
}

pub const REMEMBER_USAGE: &str = "remember <fact>";
pub const MODEL_USAGE: &str = "model <name>";
pub const RUN_USAGE: &str = "run <project> <file> [args...]";

pub const HELP: &str = "\
   help                         Show this menu
   stats                        Memory and project statistics
   projects                     List created projects
   remember <fact>              Add something to long-term memory
   model <name>                 Switch the model
   run <project> <file> [args]  Run a project file
   clear                        Forget recent conversation (facts stay)
   rescan                       Rescan the projects folder
   exit                         Quit Bars

   Project creation: just ask, e.g. \"make a snake game in python\".
   Bars writes the files and runs the main one.";

impl Command {
    /// Keywords match case-insensitively; arguments keep their case.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };
        let keyword = keyword.to_lowercase();

        match (keyword.as_str(), rest.is_empty()) {
            ("exit" | "quit" | "bye", true) => Command::Exit,
            ("help", true) => Command::Help,
            ("stats", true) => Command::Stats,
            ("projects", true) => Command::Projects,
            ("clear", true) => Command::Clear,
            ("rescan", true) => Command::Rescan,
            ("remember", true) => Command::Usage(REMEMBER_USAGE),
            ("remember", false) => Command::Remember(rest.to_string()),
            ("model", true) => Command::Usage(MODEL_USAGE),
            ("model", false) => Command::Model(rest.to_string()),
            ("run", _) => parse_run(rest),
            _ => Command::Chat(line.to_string()),
        }
    }
}

fn parse_run(rest: &str) -> Command {
    let mut parts = rest.split_whitespace().map(str::to_string);
    match (parts.next(), parts.next()) {
        (Some(project), Some(file)) => Command::Run {
            project,
            file,
            args: parts.collect(),
        },
        _ => Command::Usage(RUN_USAGE),
    }
}
