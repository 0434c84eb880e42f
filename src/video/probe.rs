use std::path::Path;
use std::process::Command;

use log::debug;
use serde::Deserialize;

use crate::errors::VideoError;

/// Properties of the first video stream of a container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Native frames per second
    pub frame_rate: f64,
    /// Declared number of frames; decoding may end earlier
    pub frame_count: u64,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Run ffprobe on `path` and describe its first video stream
pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoInfo, VideoError> {
    let path = path.as_ref();

    let output = Command::new("ffprobe")
        .args(["-v", "error", "-select_streams", "v:0"])
        .args([
            "-show_entries",
            "stream=width,height,avg_frame_rate,r_frame_rate,nb_frames,duration",
        ])
        .args(["-show_entries", "format=duration"])
        .args(["-of", "json"])
        .arg(path)
        .output()
        .map_err(|source| VideoError::ToolMissing {
            tool: "ffprobe",
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VideoError::Probe(format!(
            "ffprobe failed for {:?}: {}",
            path,
            stderr.trim()
        )));
    }

    let json = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&json)?;
    debug!("Probed {:?}: {:?}", path, info);
    Ok(info)
}

/// Interpret ffprobe's JSON output
pub fn parse_probe_output(json: &str) -> Result<VideoInfo, VideoError> {
    let parsed: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| VideoError::Probe(format!("invalid ffprobe output: {}", e)))?;

    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| VideoError::Probe("no video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(VideoError::Probe("video stream has no dimensions".to_string())),
    };

    let frame_rate = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rational)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rational))
        .ok_or_else(|| VideoError::Probe("video stream has no frame rate".to_string()))?;

    let declared = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .filter(|&n| n > 0);

    let frame_count = match declared {
        Some(count) => count,
        None => {
            let duration = stream
                .duration
                .as_deref()
                .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
                .and_then(|d| d.trim().parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d >= 0.0)
                .ok_or_else(|| {
                    VideoError::Probe("cannot determine the number of frames".to_string())
                })?;
            (duration * frame_rate).round() as u64
        }
    };

    Ok(VideoInfo {
        width,
        height,
        frame_rate,
        frame_count,
    })
}

/// Parse `"30000/1001"` or `"25"`; zero or malformed rates yield `None`
pub fn parse_rational(value: &str) -> Option<f64> {
    let value = value.trim();
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.parse().ok()?,
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}
