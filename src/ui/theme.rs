use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

use crate::schedule::ApprovalVariant;

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

/// All colors the schedule surfaces use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub brand_accent: Color32,
    pub approved_fill: Color32,
    pub approved_border: Color32,
    pub approved_text: Color32,
    pub pending_text: Color32,
    pub error_fill: Color32,
    pub error_border: Color32,
    pub error_text: Color32,
    pub grid_line: Color32,
    pub hour_line: Color32,
    pub quarter_line: Color32,
    pub axis_label: Color32,
    pub today_column: Color32,
    pub now_line: Color32,
}

impl Palette {
    pub const DEFAULT: Palette = Palette {
        brand_accent: Color32::from_rgb(0x31, 0xbc, 0xff),
        approved_fill: Color32::from_rgb(0xec, 0xfc, 0xcb),
        approved_border: Color32::from_rgb(0x84, 0xcc, 0x16),
        approved_text: Color32::from_rgb(0x36, 0x53, 0x14),
        pending_text: Color32::WHITE,
        error_fill: Color32::from_rgb(0x3b, 0x12, 0x12),
        error_border: Color32::from_rgb(0x7f, 0x1d, 0x1d),
        error_text: Color32::from_rgb(0xfc, 0xa5, 0xa5),
        grid_line: Color32::from_rgb(0x40, 0x40, 0x3c),
        hour_line: Color32::from_rgb(0x50, 0x50, 0x4a),
        quarter_line: Color32::from_rgb(0x24, 0x24, 0x22),
        axis_label: Color32::from_rgb(0x70, 0x70, 0x68),
        today_column: Color32::from_rgb(0x11, 0x11, 0x10),
        now_line: Color32::from_rgb(0xe5, 0x4d, 0x42),
    };

    /// Returns (fill, border, text) for a shift card
    pub fn card_colors(&self, variant: ApprovalVariant) -> (Color32, Color32, Color32) {
        match variant {
            ApprovalVariant::Approved => (self.approved_fill, self.approved_border, self.approved_text),
            ApprovalVariant::Pending => (self.brand_accent, self.brand_accent, self.pending_text),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub fn setup_fonts(ctx: &egui::Context) {
    ctx.set_fonts(font_definitions());
}

/// Default fonts plus Phosphor icons: regular as a proportional fallback,
/// fill in its own family for the open-shift marker
fn font_definitions() -> egui::FontDefinitions {
    let mut fonts = egui::FontDefinitions::default();

    // Add Phosphor Regular icons as fallback in Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill gets its own family; default proportional fonts follow
    // so regular text still renders
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    let mut fill_family = vec!["phosphor-fill".to_owned()];
    if let Some(proportional) = fonts.families.get(&FontFamily::Proportional) {
        fill_family.extend(proportional.iter().cloned());
    }
    fonts.families.insert(phosphor_fill_family(), fill_family);

    fonts
}

pub fn setup_theme(ctx: &egui::Context, palette: &Palette) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();

    // Background colors - pure black
    let bg = Color32::BLACK;
    visuals.panel_fill = bg;
    visuals.window_fill = Color32::from_rgb(12, 12, 11);
    visuals.faint_bg_color = Color32::from_rgb(20, 20, 18);
    visuals.extreme_bg_color = Color32::from_rgb(24, 24, 22);

    // Widget colors - warm grays (R=G > B for warmth)
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(40, 40, 38);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(176, 176, 168));

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(56, 56, 52);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(200, 200, 192));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(80, 80, 74);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::from_rgb(255, 255, 255));

    // Brand accent for active/pressed buttons, selection and links
    let accent = palette.brand_accent;
    visuals.widgets.active.bg_fill = accent;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.selection.bg_fill = accent;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = accent;

    // Rounded corners
    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);
    visuals.widgets.active.rounding = Rounding::same(6.0);
    visuals.window_rounding = Rounding::same(8.0);

    style.visuals = visuals;

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(12.0, 10.0);
    style.spacing.button_padding = egui::vec2(18.0, 10.0);
    style.spacing.window_margin = egui::Margin::same(24.0);

    ctx.set_style(style);
}

/// Returns (bg_color, text_color) for button-like elements to ensure consistency
pub fn button_colors() -> (Color32, Color32) {
    (
        Color32::from_rgb(56, 56, 52),       // bg - warm gray
        Color32::from_rgb(200, 200, 192),    // text - warm gray
    )
}

/// Returns (content_bg, frame_color, frame_text) for dialogs
pub fn dialog_colors() -> (Color32, Color32, Color32) {
    (
        Color32::BLACK,                      // content bg
        Color32::from_rgb(40, 40, 38),       // frame/border - warm gray
        Color32::from_rgb(176, 176, 168),    // frame text - warm gray
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_icons_have_their_own_family() {
        let fonts = font_definitions();
        let fill = &fonts.families[&phosphor_fill_family()];
        assert_eq!(fill[0], "phosphor-fill");
        assert!(fonts.font_data.contains_key("phosphor-fill"));
        // text drawn in the fill family still falls back to the body font
        let proportional = &fonts.families[&FontFamily::Proportional];
        assert_eq!(&fill[1..], proportional.as_slice());
    }

    #[test]
    fn approval_state_maps_to_two_palettes() {
        let palette = Palette::DEFAULT;
        let (fill, border, text) = palette.card_colors(ApprovalVariant::Pending);
        assert_eq!(fill, Color32::from_rgb(0x31, 0xbc, 0xff));
        assert_eq!(border, fill);
        assert_eq!(text, Color32::WHITE);

        let (fill, border, text) = palette.card_colors(ApprovalVariant::Approved);
        assert_eq!(border, Color32::from_rgb(0x84, 0xcc, 0x16));
        assert_eq!(text, Color32::from_rgb(0x36, 0x53, 0x14));
        assert_ne!(fill, palette.brand_accent);
    }
}
