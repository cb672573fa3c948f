//! 容器样式 - 把容器方向与网格模板转换为 Taffy 样式

use crate::schema::{ContainerNode, Orientation};
use serde_json::Value as JsonValue;
use taffy::geometry::MinMax;
use taffy::prelude::*;
use taffy::style::{
    GridTrackRepetition, LengthPercentage, MaxTrackSizingFunction, MinTrackSizingFunction,
    NonRepeatedTrackSizingFunction, TrackSizingFunction,
};

/// 构建容器的 Taffy 样式
pub fn container_style(node: &ContainerNode) -> Style {
    let mut style = match node.orientation {
        Orientation::Vertical => Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            ..Default::default()
        },
        Orientation::Horizontal => Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Row,
            ..Default::default()
        },
        Orientation::Grid => Style { display: Display::Grid, ..Default::default() },
    };

    let template = node.grid_template.as_ref();
    if node.orientation == Orientation::Grid {
        if let Some(columns) = template.and_then(|t| t.columns.as_deref()) {
            style.grid_template_columns = parse_tracks(columns);
        }
        if let Some(rows) = template.and_then(|t| t.rows.as_deref()) {
            style.grid_template_rows = parse_tracks(rows);
        }
    }

    // 网格模板的 gap 优先，其次是 style 中的 gap
    let gap = template
        .and_then(|t| t.gap.as_ref())
        .or_else(|| node.style.get("gap"))
        .and_then(parse_length);
    if let Some(gap) = gap {
        style.gap = Size { width: gap, height: gap };
    }

    style
}

/// 解析轨道列表，例如 `1fr 200px repeat(auto-fit, minmax(300px, 1fr))`
pub fn parse_tracks(spec: &str) -> Vec<TrackSizingFunction> {
    split_top_level(spec, char::is_whitespace)
        .into_iter()
        .filter_map(|token| {
            if let Some(inner) = strip_call(token, "repeat") {
                return parse_repeat(inner);
            }
            single_track(token).map(TrackSizingFunction::Single)
        })
        .collect()
}

fn parse_repeat(inner: &str) -> Option<TrackSizingFunction> {
    let (count, tracks) = inner.split_once(',')?;
    let repetition = match count.trim() {
        "auto-fit" => GridTrackRepetition::AutoFit,
        "auto-fill" => GridTrackRepetition::AutoFill,
        n => GridTrackRepetition::Count(n.parse().ok()?),
    };
    let tracks: Vec<NonRepeatedTrackSizingFunction> = split_top_level(tracks.trim(), char::is_whitespace)
        .into_iter()
        .filter_map(single_track)
        .collect();
    if tracks.is_empty() {
        return None;
    }
    Some(TrackSizingFunction::Repeat(repetition, tracks))
}

fn single_track(token: &str) -> Option<NonRepeatedTrackSizingFunction> {
    if let Some(inner) = strip_call(token, "minmax") {
        let (min, max) = inner.split_once(',')?;
        return Some(MinMax { min: min_track(min.trim())?, max: max_track(max.trim())? });
    }
    let max = max_track(token)?;
    let min = min_track(token).unwrap_or(MinTrackSizingFunction::Auto);
    Some(MinMax { min, max })
}

fn min_track(token: &str) -> Option<MinTrackSizingFunction> {
    match token {
        "auto" => Some(MinTrackSizingFunction::Auto),
        "min-content" => Some(MinTrackSizingFunction::MinContent),
        "max-content" => Some(MinTrackSizingFunction::MaxContent),
        _ => parse_length_text(token).map(MinTrackSizingFunction::Fixed),
    }
}

fn max_track(token: &str) -> Option<MaxTrackSizingFunction> {
    match token {
        "auto" => Some(MaxTrackSizingFunction::Auto),
        "min-content" => Some(MaxTrackSizingFunction::MinContent),
        "max-content" => Some(MaxTrackSizingFunction::MaxContent),
        _ => {
            if let Some(fr) = token.strip_suffix("fr") {
                return fr.trim().parse::<f32>().ok().map(MaxTrackSizingFunction::Fraction);
            }
            parse_length_text(token).map(MaxTrackSizingFunction::Fixed)
        }
    }
}

/// `20`、`20px`、`50%`
fn parse_length_text(text: &str) -> Option<LengthPercentage> {
    let text = text.trim();
    if let Some(pct) = text.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| LengthPercentage::Percent(v / 100.0));
    }
    let number = text.strip_suffix("px").unwrap_or(text);
    number.trim().parse::<f32>().ok().map(LengthPercentage::Length)
}

fn parse_length(value: &JsonValue) -> Option<LengthPercentage> {
    match value {
        JsonValue::Number(n) => n.as_f64().map(|v| LengthPercentage::Length(v as f32)),
        JsonValue::String(s) => parse_length_text(s),
        _ => None,
    }
}

/// `name(...)` 取出括号内部
fn strip_call<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    token.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')
}

/// 按分隔符切分，忽略括号内部的分隔符
fn split_top_level(text: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && is_separator(c) {
            if let Some(s) = start.take() {
                parts.push(&text[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&text[s..]);
    }
    parts
}
