//! Shell Tests
//!
//! CHARACTERIZATION: These tests feed lines to the command loop and check
//! what it prints.
//!
//! What these tests protect:
//! - Built-in commands and their messages
//! - Usage messages for commands missing arguments
//! - Conversational turns reaching the model
//!
//! What these tests intentionally do NOT assert:
//! - Line editor behavior (needs a terminal)

use bars_cli::{Flow, Shell};
use bars_config::Config;
use bars_core::Session;
use bars_providers::ScriptedRuntime;
use tempfile::TempDir;

fn shell_with(runtime: ScriptedRuntime) -> (TempDir, Shell<ScriptedRuntime, Vec<u8>>) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bars_system_prompt.txt"), "Be chill.").unwrap();

    let mut config = Config::default();
    config.paths.root_dir = dir.path().to_string_lossy().into_owned();
    config.persona.user = "Aditya".to_string();

    let session = Session::open(config, runtime).unwrap();
    (dir, Shell::new(session, Vec::new()).plain())
}

fn printed(shell: &Shell<ScriptedRuntime, Vec<u8>>) -> String {
    String::from_utf8_lossy(shell.output()).into_owned()
}

// =============================================================================
// Test: commands
// =============================================================================

mod commands {
    use super::*;

    #[tokio::test]
    async fn test_remember_then_stats() {
        let (_dir, mut shell) = shell_with(ScriptedRuntime::new(&["dolphin-mistral"]));

        shell.handle_line("remember I like tea").await.unwrap();
        shell.handle_line("stats").await.unwrap();

        let out = printed(&shell);
        assert!(out.contains("✅ Added to long-term memory: I like tea"));
        assert!(out.contains("Important facts: 1"));
        assert!(out.contains("Conversation pairs: 0"));
        assert!(out.contains("Current model: dolphin-mistral"));
        assert!(out.contains("Turns this session: 0"));
        assert_eq!(shell.session().memory().facts, vec!["I like tea"]);
    }

    #[tokio::test]
    async fn test_exit_words() {
        for word in ["exit", "QUIT", "Bye"] {
            let (_dir, mut shell) = shell_with(ScriptedRuntime::new(&[]));
            assert_eq!(shell.handle_line(word).await.unwrap(), Flow::Exit);
            assert!(printed(&shell).contains("Bars > Catch you later, Aditya!"));
        }
    }

    #[tokio::test]
    async fn test_empty_line_prints_nothing() {
        let (_dir, mut shell) = shell_with(ScriptedRuntime::new(&[]));
        assert_eq!(shell.handle_line("   ").await.unwrap(), Flow::Continue);
        assert!(printed(&shell).is_empty());
        assert!(shell.session().runtime().prompts().is_empty());
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let (_dir, mut shell) = shell_with(ScriptedRuntime::new(&[]));
        shell.handle_line("help").await.unwrap();
        let out = printed(&shell);
        for command in ["stats", "projects", "remember", "model", "run", "clear", "rescan", "exit"] {
            assert!(out.contains(command), "help should mention {command}");
        }
    }

    #[tokio::test]
    async fn test_usage_messages() {
        let (_dir, mut shell) = shell_with(ScriptedRuntime::new(&[]));
        shell.handle_line("remember").await.unwrap();
        shell.handle_line("model").await.unwrap();
        shell.handle_line("run only_project").await.unwrap();

        let out = printed(&shell);
        assert!(out.contains("❌ Usage: remember <fact>"));
        assert!(out.contains("❌ Usage: model <name>"));
        assert!(out.contains("❌ Usage: run <project> <file> [args...]"));
        assert!(shell.session().runtime().prompts().is_empty());
    }

    #[tokio::test]
    async fn test_model_switch_warns_when_missing() {
        let (_dir, mut shell) = shell_with(ScriptedRuntime::new(&["dolphin-mistral"]));
        shell.handle_line("model llama3").await.unwrap();

        let out = printed(&shell);
        assert!(out.contains("🔄 Switched to model: llama3"));
        assert!(out.contains("Model llama3 not found"));
        assert_eq!(shell.session().model(), "llama3");
    }

    #[tokio::test]
    async fn test_projects_and_run() {
        let (dir, mut shell) = shell_with(ScriptedRuntime::new(&[]));

        shell.handle_line("projects").await.unwrap();
        assert!(printed(&shell).contains("📁 No projects created yet"));

        std::fs::create_dir_all(dir.path().join("projects/demo")).unwrap();
        std::fs::write(dir.path().join("projects/demo/notes.md"), "hi").unwrap();

        shell.handle_line("projects").await.unwrap();
        shell.handle_line("run demo notes.md").await.unwrap();
        shell.handle_line("run ghost main.py").await.unwrap();

        let out = printed(&shell);
        assert!(out.contains("🎯 demo (1 files)"));
        assert!(out.contains("🚀 ❌ Don't know how to run .md files"));
        assert!(out.contains("🚀 ❌ Project 'ghost' not found"));
    }

    #[tokio::test]
    async fn test_rescan_reports_folders() {
        let (dir, mut shell) = shell_with(ScriptedRuntime::new(&[]));
        std::fs::create_dir_all(dir.path().join("projects/demo")).unwrap();
        std::fs::write(dir.path().join("projects/demo/main.py"), "").unwrap();

        shell.handle_line("rescan").await.unwrap();
        assert!(printed(&shell).contains("1 with files"));
        assert_eq!(shell.session().memory().snapshot.len(), 1);
    }
}

// =============================================================================
// Test: conversation
// =============================================================================

mod conversation {
    use super::*;

    #[tokio::test]
    async fn test_chat_line_goes_to_model() {
        let runtime = ScriptedRuntime::new(&[]).with_text("Bars: not much, you?");
        let (_dir, mut shell) = shell_with(runtime);

        shell.handle_line("what's up").await.unwrap();
        shell.handle_line("stats").await.unwrap();

        let out = printed(&shell);
        assert!(out.contains("Bars > not much, you?"));
        assert!(out.contains("Conversation pairs: 1"));
        assert!(out.contains("Turns this session: 1"));
        assert!(shell.session().runtime().prompts()[0].ends_with("Aditya: what's up\nBars:"));
    }

    #[tokio::test]
    async fn test_clear_keeps_facts() {
        let runtime = ScriptedRuntime::new(&[]).with_text("sure");
        let (_dir, mut shell) = shell_with(runtime);

        shell.handle_line("remember I like tea").await.unwrap();
        shell.handle_line("hello").await.unwrap();
        shell.handle_line("CLEAR").await.unwrap();

        assert!(printed(&shell).contains("🗑️  Cleared recent conversations"));
        assert!(shell.session().memory().turns.is_empty());
        assert_eq!(shell.session().memory().facts.len(), 1);
    }
}
