//! Convert command implementation

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::options::OptionSet;
use crate::report::{RunEntry, RunLog};
use crate::transform::{transform_css, TransformOutput};

use super::{find_css_files, is_css_file, load_options, OptionArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Where a converted file goes
#[derive(Debug, Clone, PartialEq)]
enum Destination {
    Stdout,
    File(PathBuf),
    /// `--check`: nothing is written
    Discard,
}

#[derive(Debug, Clone)]
struct Job {
    input: PathBuf,
    destination: Destination,
}

struct JobResult {
    input: PathBuf,
    destination: Destination,
    outcome: Result<TransformOutput, String>,
}

/// Expand inputs into `(file, path relative to the input root)` pairs.
///
/// Directories are searched for `*.css`; anything that is neither a file nor
/// a directory is treated as a glob pattern. Paths found through a directory
/// or a glob stay relative to the directory or to the glob's literal prefix.
fn collect_inputs(inputs: &[String]) -> Result<Vec<(PathBuf, PathBuf)>, String> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    let mut push = |file: PathBuf, relative: PathBuf| {
        if seen.insert(file.clone()) {
            files.push((file, relative));
        }
    };

    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            for file in find_css_files(path) {
                let relative = file.strip_prefix(path).map(Path::to_path_buf).unwrap_or_else(|_| file_name(&file));
                push(file, relative);
            }
        } else if path.is_file() {
            if !is_css_file(path) {
                eprintln!("Warning: '{}' does not have a .css extension", input);
            }
            push(path.to_path_buf(), file_name(path));
        } else {
            let paths = glob(input).map_err(|e| format!("Invalid glob pattern '{}': {}", input, e))?;
            let matched: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
            if matched.is_empty() {
                return Err(format!("No files match '{}'", input));
            }
            let base = glob_base(input);
            for file in matched {
                let relative = file
                    .strip_prefix(&base)
                    .ok()
                    .filter(|r| !r.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| file_name(&file));
                push(file, relative);
            }
        }
    }

    Ok(files)
}

/// Leading components of a glob pattern that hold no wildcard
fn glob_base(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(['*', '?', '[']))
        .collect()
}

fn file_name(path: &Path) -> PathBuf {
    path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf())
}

fn is_dir_target(path: &Path) -> bool {
    path.is_dir() || path.to_string_lossy().ends_with(['/', std::path::MAIN_SEPARATOR])
}

/// Decide where each file is written.
///
/// Fails when two inputs would be written to the same file.
fn plan_jobs(
    files: Vec<(PathBuf, PathBuf)>,
    output: Option<&Path>,
    in_place: bool,
    check: bool,
) -> Result<Vec<Job>, String> {
    let single = files.len() == 1;

    let jobs: Vec<Job> = files
        .into_iter()
        .map(|(input, relative)| {
            let destination = if check {
                Destination::Discard
            } else if in_place {
                Destination::File(input.clone())
            } else {
                match output {
                    Some(out) if single && !is_dir_target(out) => Destination::File(out.to_path_buf()),
                    Some(out) => Destination::File(out.join(relative)),
                    None if single => Destination::Stdout,
                    None => return Err("Multiple inputs need --output <dir>, --in-place or --check".to_string()),
                }
            };
            Ok(Job { input, destination })
        })
        .collect::<Result<_, String>>()?;

    let mut targets = HashSet::new();
    for job in &jobs {
        if let Destination::File(path) = &job.destination {
            if !targets.insert(path) {
                return Err(format!("More than one input would be written to '{}'", path.display()));
            }
        }
    }

    Ok(jobs)
}

fn process(job: &Job, options: &OptionSet) -> JobResult {
    let outcome = convert_file(job, options);
    JobResult { input: job.input.clone(), destination: job.destination.clone(), outcome }
}

fn convert_file(job: &Job, options: &OptionSet) -> Result<TransformOutput, String> {
    let css = fs::read_to_string(&job.input).map_err(|e| format!("Failed to read: {}", e))?;
    let source = job.input.to_string_lossy();
    let output = transform_css(&css, Some(&*source), options).map_err(|e| e.to_string())?;

    if let Destination::File(path) = &job.destination {
        // in-place files are only rewritten when something changed
        if output.changed() || path != &job.input {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
            }
            fs::write(path, &output.css).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
        }
    }

    Ok(output)
}

fn write_run_log(path: Option<&Path>, entries: &[RunEntry]) {
    if let Some(path) = path {
        if let Err(e) = RunLog::new(path).append(entries) {
            eprintln!("Warning: Failed to write report '{}': {}", path.display(), e);
        }
    }
}

/// Execute the convert command
pub fn run_convert(
    inputs: &[String],
    output: Option<&Path>,
    in_place: bool,
    check: bool,
    stdin: bool,
    stdin_path: Option<&str>,
    report: Option<&Path>,
    jobs: Option<usize>,
    options: &OptionArgs,
) -> ExitCode {
    if in_place && output.is_some() {
        eprintln!("Error: --in-place cannot be combined with --output");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let read_stdin = stdin || (inputs.is_empty() && !atty::is(atty::Stream::Stdin));
    if read_stdin && !inputs.is_empty() {
        eprintln!("Error: --stdin cannot be combined with input files");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if read_stdin && in_place {
        eprintln!("Error: --in-place needs input files");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if !read_stdin && inputs.is_empty() {
        eprintln!("Error: No input files (pass paths, or pipe CSS on stdin)");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let option_set = match load_options(options) {
        Ok(set) => set,
        Err(code) => return code,
    };

    if read_stdin {
        return run_stdin(output, check, stdin_path, report, &option_set);
    }

    let files = match collect_inputs(inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if files.is_empty() {
        eprintln!("Error: No .css files found");
        return ExitCode::from(EXIT_ERROR);
    }

    let planned = match plan_jobs(files, output, in_place, check) {
        Ok(planned) => planned,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(jobs.unwrap_or(0)).build() {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error: Failed to start worker threads: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let results: Vec<JobResult> =
        pool.install(|| planned.par_iter().map(|job| process(job, &option_set)).collect());

    let mut failures = 0;
    let mut would_change = 0;
    let mut entries = Vec::with_capacity(results.len());

    for result in results {
        let name = result.input.display().to_string();
        match result.outcome {
            Err(e) => {
                eprintln!("Error: {}: {}", name, e);
                failures += 1;
                entries.push(RunEntry::failed(name, e));
            }
            Ok(out) => {
                if result.destination == Destination::Stdout {
                    print!("{}", out.css);
                }
                match (&result.destination, out.report) {
                    (_, None) => eprintln!("Skipped {} (excluded)", name),
                    (Destination::Discard, Some(r)) if r.changes() > 0 => {
                        would_change += 1;
                        eprintln!("Would convert {} ({} changes)", name, r.changes());
                    }
                    (Destination::File(path), Some(r)) if r.changes() > 0 => {
                        eprintln!("Converted {} -> {} ({} changes)", name, path.display(), r.changes());
                    }
                    _ => {}
                }
                entries.push(RunEntry::finished(name, out.report));
            }
        }
    }

    write_run_log(report, &entries);

    if failures > 0 || would_change > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

fn run_stdin(
    output: Option<&Path>,
    check: bool,
    stdin_path: Option<&str>,
    report: Option<&Path>,
    options: &OptionSet,
) -> ExitCode {
    let name = stdin_path.unwrap_or("<stdin>");

    let mut css = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut css) {
        eprintln!("Error: Failed to read stdin: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    let out = match transform_css(&css, stdin_path, options) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Error: {}: {}", name, e);
            write_run_log(report, &[RunEntry::failed(name, e.to_string())]);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    write_run_log(report, &[RunEntry::finished(name, out.report)]);

    if check {
        return if out.changed() { ExitCode::from(EXIT_ERROR) } else { ExitCode::from(EXIT_SUCCESS) };
    }

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &out.css) {
                eprintln!("Error: Failed to write '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        None => print!("{}", out.css),
    }

    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files(names: &[&str]) -> Vec<(PathBuf, PathBuf)> {
        names.iter().map(|n| (PathBuf::from(n), file_name(Path::new(n)))).collect()
    }

    #[test]
    fn test_plan_single_to_stdout() {
        let jobs = plan_jobs(files(&["a.css"]), None, false, false).unwrap();
        assert_eq!(jobs[0].destination, Destination::Stdout);
    }

    #[test]
    fn test_plan_single_to_file() {
        let jobs = plan_jobs(files(&["a.css"]), Some(Path::new("out.css")), false, false).unwrap();
        assert_eq!(jobs[0].destination, Destination::File(PathBuf::from("out.css")));
    }

    #[test]
    fn test_plan_multiple_into_dir() {
        let jobs = plan_jobs(files(&["src/a.css", "src/b.css"]), Some(Path::new("dist")), false, false).unwrap();
        assert_eq!(jobs[0].destination, Destination::File(PathBuf::from("dist/a.css")));
        assert_eq!(jobs[1].destination, Destination::File(PathBuf::from("dist/b.css")));
    }

    #[test]
    fn test_plan_multiple_needs_output() {
        assert!(plan_jobs(files(&["a.css", "b.css"]), None, false, false).is_err());
        assert!(plan_jobs(files(&["a.css", "b.css"]), None, false, true).is_ok());
    }

    #[test]
    fn test_plan_rejects_shared_destination() {
        let err = plan_jobs(files(&["src/a/x.css", "src/b/x.css"]), Some(Path::new("dist")), false, false)
            .unwrap_err();
        assert!(err.contains("dist/x.css"), "{}", err);

        let nested = vec![
            (PathBuf::from("src/a/x.css"), PathBuf::from("a/x.css")),
            (PathBuf::from("src/b/x.css"), PathBuf::from("b/x.css")),
        ];
        assert!(plan_jobs(nested, Some(Path::new("dist")), false, false).is_ok());
    }

    #[test]
    fn test_plan_in_place_and_check() {
        let jobs = plan_jobs(files(&["a.css"]), None, true, false).unwrap();
        assert_eq!(jobs[0].destination, Destination::File(PathBuf::from("a.css")));
        let jobs = plan_jobs(files(&["a.css"]), None, false, true).unwrap();
        assert_eq!(jobs[0].destination, Destination::Discard);
    }

    #[test]
    fn test_collect_inputs_dir_keeps_relative_paths() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("a.css"), "").unwrap();
        fs::write(temp.path().join("nested/b.css"), "").unwrap();

        let root = temp.path().to_string_lossy().to_string();
        let collected = collect_inputs(&[root.clone(), root]).unwrap();
        let relative: Vec<PathBuf> = collected.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(relative, vec![PathBuf::from("a.css"), PathBuf::from("nested/b.css")]);
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("src/**/*.css"), PathBuf::from("src"));
        assert_eq!(glob_base("styles/a/[ab].css"), PathBuf::from("styles/a"));
        assert_eq!(glob_base("*.css"), PathBuf::new());
    }

    #[test]
    fn test_collect_inputs_glob_keeps_relative_paths() {
        let temp = TempDir::new().unwrap();
        for dir in ["a", "b"] {
            fs::create_dir_all(temp.path().join("src").join(dir)).unwrap();
            fs::write(temp.path().join("src").join(dir).join("x.css"), "").unwrap();
        }

        let pattern = format!("{}/src/**/*.css", temp.path().display());
        let mut relative: Vec<PathBuf> = collect_inputs(&[pattern]).unwrap().into_iter().map(|(_, r)| r).collect();
        relative.sort();
        assert_eq!(relative, vec![PathBuf::from("a/x.css"), PathBuf::from("b/x.css")]);
    }

    #[test]
    fn test_collect_inputs_no_match() {
        let err = collect_inputs(&["/nonexistent/*.css".to_string()]).unwrap_err();
        assert!(err.contains("No files match"));
    }

    #[test]
    fn test_convert_file_in_place_untouched_when_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.css");
        fs::write(&path, "a{margin:8px}").unwrap();

        let job = Job { input: path.clone(), destination: Destination::File(path.clone()) };
        let out = convert_file(&job, &OptionSet::default()).unwrap();
        assert!(!out.changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a{margin:8px}");
    }

    #[test]
    fn test_convert_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.css");
        fs::write(&input, "a { font-size: 32px; }").unwrap();
        let dest = temp.path().join("dist/deep/a.css");

        let job = Job { input, destination: Destination::File(dest.clone()) };
        convert_file(&job, &OptionSet::default()).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), "a { font-size: 2rem; }");
    }
}
