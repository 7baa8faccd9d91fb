use plate384::{
    about,
    parameters::ConverterParameters,
    plate_converter::PlateConverter,
    plate_template::PlateGrid,
    protocol::Capabilities,
    results_average::{AverageOptions, average_results_path, write_summary_csv},
    sample_setup::{output_file_name, write_sample_setup_file},
    target_panel::{TargetPanel, parse_name_list},
};
use serde::Serialize;
use std::{env, fs::File, io, path::PathBuf};

fn usage() {
    eprintln!(
        "Usage:\n  \
  plate384_cli --version\n  \
  plate384_cli [--config PATH] capabilities\n  \
  plate384_cli [--config PATH] show-config\n  \
  plate384_cli [--config PATH] convert TEMPLATE.csv [--replicates duplicates|triplicates]\n  \
               [--targets T1,T2,..] [--reporters R1,R2,..] [--panel PANEL.csv]\n  \
               [--sort] [--output OUTPUT.csv]\n  \
  plate384_cli [--config PATH] average RESULTS.csv [--output SUMMARY.csv]\n\n  \
  Environment: PLATE384_REPLICATES, PLATE384_EMPTY_SAMPLE_NAME, PLATE384_OUTPUT_SUFFIX\n  \
  Logging: RUST_LOG=info|debug"
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_config_arg(args: &[String]) -> (Option<String>, usize) {
    if args.len() >= 3 && args[1] == "--config" {
        return (Some(args[2].clone()), 3);
    }
    (None, 1)
}

#[derive(Default)]
struct ConvertArgs {
    template: Option<String>,
    replicates: Option<String>,
    targets: Option<String>,
    reporters: Option<String>,
    panel: Option<String>,
    sort: bool,
    output: Option<String>,
}

fn flag_value(args: &[String], idx: usize, flag: &str) -> Result<String, String> {
    args.get(idx + 1)
        .cloned()
        .ok_or_else(|| format!("Missing value for {flag}"))
}

fn parse_convert_args(args: &[String]) -> Result<ConvertArgs, String> {
    let mut ret = ConvertArgs::default();
    let mut idx = 0;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "--replicates" => {
                ret.replicates = Some(flag_value(args, idx, arg)?);
                idx += 1;
            }
            "--targets" => {
                ret.targets = Some(flag_value(args, idx, arg)?);
                idx += 1;
            }
            "--reporters" => {
                ret.reporters = Some(flag_value(args, idx, arg)?);
                idx += 1;
            }
            "--panel" => {
                ret.panel = Some(flag_value(args, idx, arg)?);
                idx += 1;
            }
            "--output" => {
                ret.output = Some(flag_value(args, idx, arg)?);
                idx += 1;
            }
            "--sort" => ret.sort = true,
            _ if arg.starts_with("--") => return Err(format!("Unknown option '{arg}'")),
            _ if ret.template.is_none() => ret.template = Some(arg.to_string()),
            _ => return Err(format!("Unexpected argument '{arg}'")),
        }
        idx += 1;
    }
    Ok(ret)
}

fn resolve_panel(args: &ConvertArgs, params: &ConverterParameters) -> Result<TargetPanel, String> {
    if let Some(path) = &args.panel {
        return TargetPanel::from_csv_path(path).map_err(|e| e.to_string());
    }
    match (&args.targets, &args.reporters) {
        (Some(targets), Some(reporters)) => Ok(TargetPanel::from_lists(
            parse_name_list(targets),
            parse_name_list(reporters),
        )),
        (None, None) => Ok(params.target_panel()),
        _ => Err("--targets and --reporters must be given together".to_string()),
    }
}

fn run_convert(args: &[String], mut params: ConverterParameters) -> Result<(), String> {
    let args = parse_convert_args(args)?;
    let Some(template) = args.template.clone() else {
        usage();
        return Err("Missing template path for convert".to_string());
    };
    if let Some(mode) = &args.replicates {
        params.replicate_mode = mode.clone();
    }
    if args.sort {
        params.sort_output = true;
    }
    let panel = resolve_panel(&args, &params)?;
    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => output_file_name(&PathBuf::from(&template), &params.output_suffix),
    };

    let grid =
        PlateGrid::from_template_path(&template, &params.template).map_err(|e| e.to_string())?;
    let conversion = PlateConverter::new(params)
        .convert(&grid, &panel)
        .map_err(|e| e.to_string())?;
    write_sample_setup_file(&conversion.rows, &output).map_err(|e| e.to_string())?;
    eprintln!(
        "Wrote {} rows for '{template}' to '{}'",
        conversion.rows.len(),
        output.display()
    );
    print_json(&conversion.report)
}

fn run_average(args: &[String], params: &ConverterParameters) -> Result<(), String> {
    let mut results = None;
    let mut output = None;
    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--output" => {
                output = Some(flag_value(args, idx, "--output")?);
                idx += 1;
            }
            arg if arg.starts_with("--") => return Err(format!("Unknown option '{arg}'")),
            arg if results.is_none() => results = Some(arg.to_string()),
            arg => return Err(format!("Unexpected argument '{arg}'")),
        }
        idx += 1;
    }
    let Some(results) = results else {
        usage();
        return Err("Missing results path for average".to_string());
    };

    let summaries = average_results_path(&results, &AverageOptions::from(params))
        .map_err(|e| e.to_string())?;
    match output {
        Some(path) => {
            let file =
                File::create(&path).map_err(|e| format!("Could not create '{path}': {e}"))?;
            write_summary_csv(&summaries, file).map_err(|e| e.to_string())?;
            eprintln!("Wrote {} summaries to '{path}'", summaries.len());
        }
        None => write_summary_csv(&summaries, io::stdout()).map_err(|e| e.to_string())?,
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (config_path, cmd_idx) = parse_global_config_arg(&args);
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }
    let params = ConverterParameters::resolve(config_path.as_deref()).map_err(|e| e.to_string())?;

    let command = &args[cmd_idx];
    let rest = &args[cmd_idx + 1..];
    match command.as_str() {
        "capabilities" => print_json(&Capabilities::current()),
        "show-config" => print_json(&params),
        "convert" => run_convert(rest, params),
        "average" => run_average(rest, &params),
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
