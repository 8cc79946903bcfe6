use clap::Parser;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install everything from Pipfile.lock:\n    pinenv install\n\n\
                   Install including development packages:\n    pinenv install --dev\n\n\
                   Add packages to the project:\n    pinenv install requests 'flask>=2'\n\n\
                   Add an editable VCS package:\n    pinenv install -e git+https://github.com/org/lib.git#egg=lib\n\n\
                   Install without touching Pipfile.lock:\n    pinenv install --skip-lock\n\n\
                   Create the virtualenv with a specific interpreter:\n    pinenv install --python 3.11")]
pub struct InstallArgs {
    /// Requirements to install and add to the Pipfile (e.g. requests, 'flask>=2')
    pub packages: Vec<String>,

    /// Editable VCS requirement (e.g. git+https://host/repo.git#egg=name)
    #[arg(long, short = 'e', value_name = "URL")]
    pub editable: Vec<String>,

    /// Use [dev-packages]: install them too, or add packages there
    #[arg(long, short = 'd')]
    pub dev: bool,

    /// Install from the Pipfile directly and leave Pipfile.lock alone
    #[arg(long)]
    pub skip_lock: bool,

    /// Install into the interpreter on PATH instead of the project virtualenv
    #[arg(long)]
    pub system: bool,

    /// Install from Pipfile.lock even if the Pipfile changed since it was written
    #[arg(long = "ignore-pipfile", alias = "ignore-manifest")]
    pub ignore_pipfile: bool,

    /// Refuse to install packages without recorded hashes
    #[arg(long)]
    pub require_hashes: bool,

    /// Do not record hashes when Pipfile.lock is regenerated
    #[arg(long)]
    pub no_hashes: bool,

    /// Interpreter to create the virtualenv with
    #[arg(long, value_name = "VERSION", conflicts_with_all = ["three", "two"])]
    pub python: Option<String>,

    /// Create the virtualenv with python3
    #[arg(long, conflicts_with = "two")]
    pub three: bool,

    /// Create the virtualenv with python2
    #[arg(long)]
    pub two: bool,
}

impl InstallArgs {
    /// The interpreter explicitly requested, if any
    pub fn python_request(&self) -> Option<String> {
        python_request(self.python.as_deref(), self.three, self.two)
    }

    pub fn has_packages(&self) -> bool {
        !self.packages.is_empty() || !self.editable.is_empty()
    }
}

/// `--python` wins, then `--three` / `--two`
pub fn python_request(python: Option<&str>, three: bool, two: bool) -> Option<String> {
    match (python, three, two) {
        (Some(python), _, _) => Some(python.to_string()),
        (None, true, _) => Some("python3".to_string()),
        (None, false, true) => Some("python2".to_string()),
        (None, false, false) => None,
    }
}
