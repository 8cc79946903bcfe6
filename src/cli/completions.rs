use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    pinenv completions bash > ~/.bash_completion.d/pinenv\n\n\
                  Generate zsh completions:\n    pinenv completions zsh > ~/.zfunc/_pinenv\n\n\
                  Generate fish completions:\n    pinenv completions fish > ~/.config/fish/completions/pinenv.fish\n\n\
                  Generate PowerShell completions:\n    pinenv completions powershell")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
