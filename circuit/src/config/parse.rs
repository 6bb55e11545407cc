use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use super::TrackSettings;

const COMMENT_STR: &str = "//";

enum Tag {
    StepCount,
    Scale,
    Deform,
    TrackWidth,
    KerbWidth,
    ShoulderWidth,
    LaneLineWidth,
    KerbBandLength,
    Layers,
    FrameCount,
    TargetFps,
    PilotSpeed,
}

impl TryFrom<&str> for Tag {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self> {
        match s {
            "STEP_COUNT" => Ok(Tag::StepCount),
            "SCALE" => Ok(Tag::Scale),
            "DEFORM" => Ok(Tag::Deform),
            "TRACK_WIDTH" => Ok(Tag::TrackWidth),
            "KERB_WIDTH" => Ok(Tag::KerbWidth),
            "SHOULDER_WIDTH" => Ok(Tag::ShoulderWidth),
            "LANE_LINE_WIDTH" => Ok(Tag::LaneLineWidth),
            "KERB_BAND_LENGTH" => Ok(Tag::KerbBandLength),
            "LAYERS" => Ok(Tag::Layers),
            "FRAME_COUNT" => Ok(Tag::FrameCount),
            "TARGET_FPS" => Ok(Tag::TargetFps),
            "PILOT_SPEED" => Ok(Tag::PilotSpeed),
            _ => Err(anyhow!("Invalid string for Tag conversion: {}", s)),
        }
    }
}

fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

/// Parses exactly `N` whitespace separated values.
fn parse_values<T, const N: usize>(subs: &[&str]) -> Result<[T; N]>
where
    T: FromStr + Copy + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if subs.len() != N {
        bail!("Expected {} value(s), found {}", N, subs.len());
    }

    let mut values = [T::default(); N];
    for (value, sub) in values.iter_mut().zip(subs) {
        *value = sub
            .parse()
            .with_context(|| format!("Invalid value `{}`", sub))?;
    }

    Ok(values)
}

fn parse_value<T>(subs: &[&str]) -> Result<T>
where
    T: FromStr + Copy + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let [value] = parse_values::<T, 1>(subs)?;
    Ok(value)
}

fn parse_switch(val: &str) -> Result<bool> {
    match val {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        _ => Err(anyhow!("Unrecognized switch token `{}`", val)),
    }
}

fn apply_value(settings: &mut TrackSettings, tag: &Tag, subs: &[&str]) -> Result<()> {
    let params = &mut settings.parameters;
    match tag {
        Tag::StepCount => params.step_count = parse_value(subs)?,
        Tag::Scale => {
            let [scale_x, scale_z] = parse_values::<f64, 2>(subs)?;
            params.scale_x = scale_x;
            params.scale_z = scale_z;
        }
        Tag::Deform => match subs {
            [switch] => params.deform = parse_switch(switch)?,
            _ => bail!("Expected 1 value(s), found {}", subs.len()),
        },
        Tag::TrackWidth => params.track_width = parse_value(subs)?,
        Tag::KerbWidth => params.kerb_width = parse_value(subs)?,
        Tag::ShoulderWidth => params.shoulder_width = parse_value(subs)?,
        Tag::LaneLineWidth => params.lane_line_width = parse_value(subs)?,
        Tag::KerbBandLength => params.kerb_band_length = parse_value(subs)?,
        Tag::Layers => {
            let [sand, asphalt, lines, kerb] = parse_values::<f32, 4>(subs)?;
            params.layers.sand = sand;
            params.layers.asphalt = asphalt;
            params.layers.lines = lines;
            params.layers.kerb = kerb;
        }
        Tag::FrameCount => settings.frame_count = parse_value(subs)?,
        Tag::TargetFps => settings.target_fps = parse_value(subs)?,
        Tag::PilotSpeed => settings.pilot_speed = parse_value(subs)?,
    }

    Ok(())
}

/// Each tag line is followed by the value line it configures. Anything not mentioned
/// keeps its default.
pub fn parse_track_settings<I>(lines: I) -> Result<TrackSettings>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut settings = TrackSettings::default();
    let mut current_tag = None::<Tag>;

    for (line_index, line) in lines.into_iter().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_number = line_index + 1;

        if line.is_empty() || line.starts_with(COMMENT_STR) {
            continue;
        }

        if let Ok(tag) = Tag::try_from(line) {
            current_tag = Some(tag);
            continue;
        }

        let Some(tag) = &current_tag else {
            bail!("Line {}: value `{}` appears before any tag", line_number, line);
        };
        let subs = line.split_whitespace().collect::<Vec<_>>();
        apply_value(&mut settings, tag, &subs)
            .with_context(|| format!("Line {}: `{}`", line_number, line))?;
    }

    settings.validate()?;

    Ok(settings)
}

pub fn parse_track_file(file_path: &str) -> Result<TrackSettings> {
    let lines = read_lines(file_path)
        .with_context(|| format!("Failed to open track file `{}`", file_path))?;
    let settings = parse_track_settings(lines)
        .with_context(|| format!("Failed to parse track file `{}`", file_path))?;

    log::debug!("Track settings from `{}`: {:#?}", file_path, settings);

    Ok(settings)
}
