//! `jnm` — symbol lister analogous to `nm`.
//!
//! Enumerates defined and referenced symbols (classes, static fields,
//! instance fields, methods) with visibility and size/offset, for each
//! `.class` or `.jar` given on the command line.
//!
//! Exact textual layout is a thin shell over the core (spec §1 "Out of
//! scope"); what's load-bearing is the per-symbol `normal_display` format
//! and the filter/sort/display pipeline in `jloader::pipeline`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use jloader::archive::Archive;
use jloader::class_file::ClassFile;
use jloader::pipeline::{Display, Filter, Located, Pipeline, Sort};
use jloader::symbols;

#[derive(Parser, Debug)]
#[command(name = "jnm", author, version, about = "List symbols from Java class files", long_about = None)]
struct Args {
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// No sorting (default).
    #[arg(short = 'p', long = "no-sort")]
    no_sort: bool,
    /// Sort symbols by value.
    #[arg(short = 'n', long = "numeric-sort")]
    numeric_sort: bool,
    /// Reverse the sort order.
    #[arg(short = 'r', long = "reverse-sort")]
    reverse_sort: bool,
    /// Sort symbols alphabetically.
    #[arg(short = 'a', long = "alpha-sort")]
    alpha_sort: bool,

    /// Show only undefined (reference) symbols.
    #[arg(short = 'u', long = "undefined-only")]
    undefined_only: bool,
    /// Show only defined symbols.
    #[arg(short = 'U', long = "defined-only")]
    defined_only: bool,
    /// Show only non-private (external) symbols.
    #[arg(short = 'g', long = "extern-only")]
    extern_only: bool,
    /// Show only class symbols.
    #[arg(short = 'c', long = "class-only")]
    class_only: bool,
    /// Resolve references against the whole input set, not just their own class.
    #[arg(short = 'f', long = "flatten")]
    flatten: bool,

    /// Prepend the file name to every line instead of grouping by file.
    #[arg(short = 'A', long = "print-file-name")]
    print_file_name: bool,
    /// Print only the symbol name.
    #[arg(short = 'j', long = "symbols-only")]
    symbols_only: bool,
    /// Attach a demangled signature to each symbol.
    #[arg(short = 'C', long = "demangle")]
    demangle: bool,

    /// Use 32-bit pointers when sizing reference/array fields.
    #[arg(long = "m32")]
    m32: bool,
    /// Use 64-bit pointers (default).
    #[arg(long = "m64")]
    m64: bool,
}

impl Args {
    fn pipeline(&self) -> Pipeline {
        let mut filters = Vec::new();
        if self.flatten {
            filters.push(Filter::ResolveAll);
        }
        if self.undefined_only {
            filters.push(Filter::RemoveDefined);
        }
        if self.defined_only {
            filters.push(Filter::RemoveUndefined);
        }
        if self.extern_only {
            filters.push(Filter::RemovePrivate);
        }
        if self.class_only {
            filters.push(Filter::RemoveNonClass);
        }

        let mut sorts = Vec::new();
        if self.numeric_sort {
            sorts.push(Sort::Numeric);
        }
        if self.alpha_sort {
            sorts.push(Sort::Alphabetic);
        }
        if self.reverse_sort {
            sorts.push(Sort::Reverse);
        }
        if sorts.is_empty() {
            sorts.push(Sort::Noop);
        }

        let mut displays = Vec::new();
        if self.print_file_name {
            displays.push(Display::PrependFilename);
        }
        if self.symbols_only {
            displays.push(Display::NameOnly);
        }
        if self.demangle {
            displays.push(Display::Demangle);
        }
        if displays.is_empty() {
            displays.push(Display::NormalDisplay);
        }

        Pipeline { filters, sorts, displays }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                clap::error::ErrorKind::UnknownArgument => 1,
                _ => 2,
            };
            err.print().ok();
            return ExitCode::from(code);
        }
    };

    jloader::set_pointer_size(if args.m32 { 4 } else { 8 });

    let mut located = Vec::new();
    let mut had_error = false;
    for path in &args.files {
        if let Err(err) = collect(path, &mut located) {
            eprintln!("{}: {err}", path.display());
            had_error = true;
        }
    }

    let pipeline = args.pipeline();
    let rendered = pipeline.run(located);
    let multiple_sources = args.files.len() > 1;
    let mut last_header: Option<(String, Option<String>)> = None;

    for (item, line) in &rendered {
        if multiple_sources && !args.print_file_name {
            let header = (item.source_file.clone(), item.jar_entry.clone());
            if last_header.as_ref() != Some(&header) {
                match &header.1 {
                    Some(entry) => println!("\n{}({entry}):", header.0),
                    None => println!("\n{}:", header.0),
                }
                last_header = Some(header);
            }
        }
        println!("{line}");
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn collect(path: &PathBuf, out: &mut Vec<Located>) -> Result<(), Box<dyn std::error::Error>> {
    let is_jar = path.extension().and_then(|e| e.to_str()) == Some("jar");
    let source_file = path.display().to_string();
    if is_jar {
        let mut archive = Archive::open(path)?;
        for entry in archive.class_entries()? {
            match entry.result {
                Ok(class) => push_class(&source_file, Some(entry.name), &class, out)?,
                Err(err) => eprintln!("{source_file}({}): {err}", entry.name),
            }
        }
    } else {
        let bytes = std::fs::read(path)?;
        let class = ClassFile::parse(&bytes)?;
        push_class(&source_file, None, &class, out)?;
    }
    Ok(())
}

fn push_class(
    source_file: &str,
    jar_entry: Option<String>,
    class: &ClassFile,
    out: &mut Vec<Located>,
) -> Result<(), Box<dyn std::error::Error>> {
    let class_name = jloader::descriptors::fqcn(class.this_class_name()?);
    for symbol in symbols::extract(class)? {
        out.push(Located {
            source_file: source_file.to_string(),
            jar_entry: jar_entry.clone(),
            class_name: class_name.clone(),
            symbol,
        });
    }
    Ok(())
}
