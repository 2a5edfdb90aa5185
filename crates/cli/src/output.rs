use clap::ValueEnum;

/// Supported output formats for inspected findings.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Sarif,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            "sarif" => Ok(Format::Sarif),
            _ => Err("invalid format".into()),
        }
    }
}

impl From<Format> for reporters::Format {
    fn from(fmt: Format) -> Self {
        match fmt {
            Format::Text => reporters::Format::Text,
            Format::Json => reporters::Format::Json,
            Format::Sarif => reporters::Format::Sarif,
        }
    }
}

/// Supported output formats for the fix-run summary.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum SummaryFormat {
    Text,
    Json,
}

impl From<SummaryFormat> for reporters::Format {
    fn from(fmt: SummaryFormat) -> Self {
        match fmt {
            SummaryFormat::Text => reporters::Format::Text,
            SummaryFormat::Json => reporters::Format::Json,
        }
    }
}
