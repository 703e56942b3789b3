//! Cell style descriptors for exported sheets and their mapping onto
//! `umya_spreadsheet` styles.

use serde::{Deserialize, Serialize};
use umya_spreadsheet::structs::{EnumTrait, HorizontalAlignmentValues, VerticalAlignmentValues};
use umya_spreadsheet::{Border, PatternValues, Style};

pub const BORDER_THIN: &str = "thin";
pub const WHITE: &str = "FFFFFFFF";
pub const BORDER_GREY: &str = "FFBFBFBF";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub font: Option<FontDescriptor>,
    pub fill_color: Option<String>,
    pub border: Option<BorderSideDescriptor>,
    pub horizontal: Option<String>,
    pub number_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub bold: Option<bool>,
    pub color: Option<String>,
}

/// Applied to all four sides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSideDescriptor {
    pub style: String,
    pub color: Option<String>,
}

impl BorderSideDescriptor {
    pub fn thin() -> Self {
        Self {
            style: BORDER_THIN.to_string(),
            color: Some(BORDER_GREY.to_string()),
        }
    }
}

/// Bold white text, centered, on a solid `fill_argb` background, thin borders.
pub fn header_style(fill_argb: &str) -> StyleDescriptor {
    StyleDescriptor {
        font: Some(FontDescriptor {
            bold: Some(true),
            color: Some(WHITE.to_string()),
        }),
        fill_color: Some(fill_argb.to_string()),
        border: Some(BorderSideDescriptor::thin()),
        horizontal: Some("center".to_string()),
        number_format: None,
    }
}

pub fn data_style(number_format: Option<&str>) -> StyleDescriptor {
    StyleDescriptor {
        border: Some(BorderSideDescriptor::thin()),
        number_format: number_format.map(str::to_string),
        ..Default::default()
    }
}

pub fn apply_descriptor_to_style(style: &mut Style, desc: &StyleDescriptor) {
    if let Some(font_desc) = &desc.font {
        let font = style.get_font_mut();
        if let Some(bold) = font_desc.bold {
            font.set_bold(bold);
        }
        if let Some(color) = &font_desc.color {
            font.get_color_mut().set_argb(color.clone());
        }
    }

    if let Some(fill) = &desc.fill_color {
        let pattern = style.get_fill_mut().get_pattern_fill_mut();
        pattern.set_pattern_type(PatternValues::Solid);
        pattern.get_foreground_color_mut().set_argb(fill.clone());
    }

    if let Some(side) = &desc.border {
        let borders = style.get_borders_mut();
        apply_border_side(borders.get_left_border_mut(), side);
        apply_border_side(borders.get_right_border_mut(), side);
        apply_border_side(borders.get_top_border_mut(), side);
        apply_border_side(borders.get_bottom_border_mut(), side);
    }

    if let Some(horizontal) = &desc.horizontal {
        let alignment = style.get_alignment_mut();
        if horizontal.eq_ignore_ascii_case("center") {
            alignment.set_horizontal(HorizontalAlignmentValues::Center);
            alignment.set_vertical(VerticalAlignmentValues::Center);
        } else if horizontal.eq_ignore_ascii_case("right") {
            alignment.set_horizontal(HorizontalAlignmentValues::Right);
        } else if horizontal.eq_ignore_ascii_case("left") {
            alignment.set_horizontal(HorizontalAlignmentValues::Left);
        }
    }

    if let Some(code) = &desc.number_format {
        style.get_number_format_mut().set_format_code(code.clone());
    }
}

fn apply_border_side(border: &mut Border, side: &BorderSideDescriptor) {
    border.set_border_style(side.style.clone());
    if let Some(color) = &side.color {
        border.get_color_mut().set_argb(color.clone());
    }
}

/// Reads back the subset of a style this module writes.
pub fn descriptor_from_style(style: &Style) -> StyleDescriptor {
    let font = style.get_font().and_then(|font| {
        let bold = *font.get_bold();
        let color = font.get_color().get_argb().to_string();
        if !bold && color.is_empty() {
            None
        } else {
            Some(FontDescriptor {
                bold: bold.then_some(true),
                color: Some(color).filter(|c| !c.is_empty()),
            })
        }
    });

    let fill_color = style
        .get_fill()
        .and_then(|fill| fill.get_pattern_fill())
        .and_then(|pattern| pattern.get_foreground_color())
        .map(|color| color.get_argb().to_string())
        .filter(|argb| !argb.is_empty());

    let border = style.get_borders().and_then(|borders| {
        let left = borders.get_left_border();
        let kind = left.get_border_style();
        if kind.is_empty() || kind.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(BorderSideDescriptor {
                style: kind.to_string(),
                color: Some(left.get_color().get_argb().to_string()).filter(|c| !c.is_empty()),
            })
        }
    });

    let horizontal = style
        .get_alignment()
        .map(|alignment| alignment.get_horizontal().get_value_string().to_string())
        .filter(|value| !value.eq_ignore_ascii_case("general"));

    let number_format = style.get_number_format().and_then(|fmt| {
        let code = fmt.get_format_code();
        if code.eq_ignore_ascii_case("general") {
            None
        } else {
            Some(code.to_string())
        }
    });

    StyleDescriptor {
        font,
        fill_color,
        border,
        horizontal,
        number_format,
    }
}
