// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use clap::{Parser, Subcommand};
use log::debug;
use vision_client::{Client, Error, FeatureKind, FeatureOptions, FeatureValue, VisionConfig};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Annotation service endpoint URL
    #[clap(long, env = "VISION_ENDPOINT")]
    endpoint: Option<String>,

    /// Annotation service API key
    #[clap(long, env = "VISION_KEY", hide_env_values = true)]
    key: Option<String>,

    /// OAuth access token, used when no API key is given
    #[clap(long, env = "VISION_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Client Command
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Annotate one or more images in a single batch request and print the
    /// results as JSON.  Images may be local paths, http(s) URLs or gs://
    /// storage objects.
    ///
    /// Each feature flag takes an optional count.  Without a count, or with
    /// a non-numeric value, the configured default count is used.
    #[command(visible_aliases = ["mark", "detect"])]
    Annotate {
        /// Images to annotate
        #[clap(required = true)]
        images: Vec<String>,

        /// Detect faces
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        faces: Option<String>,

        /// Detect landmarks
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        landmarks: Option<String>,

        /// Detect logos
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        logos: Option<String>,

        /// Detect labels
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        labels: Option<String>,

        /// Detect text
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        text: Option<String>,

        /// Rate explicit content
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        safe_search: Option<String>,

        /// Report dominant colors
        #[clap(long, num_args = 0..=1, default_missing_value = "true")]
        properties: Option<String>,

        /// Print compact single-line JSON
        #[clap(long)]
        compact: bool,
    },
    /// Show the default result count used for each feature.
    Defaults,
}

/// Interprets a command line feature value.  Unlike values passed through
/// the library API, a numeric argument is an explicit count here since the
/// shell has no integer type.
fn feature_value(value: &str) -> FeatureValue {
    match value {
        "true" | "yes" | "on" => FeatureValue::Boolean(true),
        "false" | "no" | "off" => FeatureValue::Boolean(false),
        _ => match value.parse::<i64>() {
            Ok(n) => FeatureValue::Integer(n),
            Err(_) => FeatureValue::String(value.to_string()),
        },
    }
}

fn config(args: &Args) -> Result<VisionConfig, Error> {
    let mut config = VisionConfig::load()?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if args.key.is_some() {
        config.key = args.key.clone();
    }
    if args.token.is_some() {
        config.token = args.token.clone();
    }
    debug!("Using endpoint {}", config.endpoint);
    Ok(config)
}

// Command handler functions

async fn handle_annotate(
    client: &Client,
    images: Vec<String>,
    features: Vec<(FeatureKind, Option<String>)>,
    compact: bool,
) -> Result<(), Error> {
    let options = features
        .into_iter()
        .filter_map(|(kind, value)| value.map(|value| (kind, value)))
        .fold(FeatureOptions::new(), |options, (kind, value)| {
            options.with(kind, feature_value(&value))
        });

    // Per-image errors are logged by the client and kept in the output.
    let annotated = client.annotate(&images, &options).await?;

    let output = match compact {
        true => serde_json::to_string(&annotated)?,
        false => serde_json::to_string_pretty(&annotated)?,
    };
    println!("{}", output);
    Ok(())
}

fn handle_defaults(client: &Client) -> Result<(), Error> {
    for kind in FeatureKind::ALL {
        println!(
            "{:<12} {:<22} {}",
            kind.name(),
            kind.as_api_type(),
            client.defaults().get(kind)
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let client = Client::from_config(&config(&args)?)?;

    match args.cmd {
        Command::Annotate {
            images,
            faces,
            landmarks,
            logos,
            labels,
            text,
            safe_search,
            properties,
            compact,
        } => {
            let features = vec![
                (FeatureKind::Faces, faces),
                (FeatureKind::Landmarks, landmarks),
                (FeatureKind::Logos, logos),
                (FeatureKind::Labels, labels),
                (FeatureKind::Text, text),
                (FeatureKind::SafeSearch, safe_search),
                (FeatureKind::Properties, properties),
            ];
            handle_annotate(&client, images, features, compact).await
        }
        Command::Defaults => handle_defaults(&client),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_value() {
        assert_eq!(feature_value("true"), FeatureValue::Boolean(true));
        assert_eq!(feature_value("off"), FeatureValue::Boolean(false));
        assert_eq!(feature_value("5"), FeatureValue::Integer(5));
        assert_eq!(feature_value("0"), FeatureValue::Integer(0));
        assert_eq!(feature_value("many"), FeatureValue::String("many".into()));
    }

    #[test]
    fn test_aliases_parse_to_annotate() {
        for alias in ["annotate", "mark", "detect"] {
            let args = Args::try_parse_from(["vision", alias, "a.jpg", "--labels", "3"]).unwrap();
            match args.cmd {
                Command::Annotate { images, labels, .. } => {
                    assert_eq!(images, vec!["a.jpg".to_string()]);
                    assert_eq!(labels.as_deref(), Some("3"));
                }
                Command::Defaults => panic!("{} parsed as defaults", alias),
            }
        }
    }

    #[test]
    fn test_flag_without_value_uses_default() {
        let args = Args::try_parse_from(["vision", "annotate", "a.jpg", "--faces"]).unwrap();
        match args.cmd {
            Command::Annotate { faces, labels, .. } => {
                assert_eq!(faces.as_deref(), Some("true"));
                assert!(labels.is_none());
            }
            Command::Defaults => unreachable!(),
        }
    }
}
