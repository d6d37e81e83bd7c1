use egui::{Color32, RichText, Ui};

use super::theme::Palette;

/// What the sign-in screen asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    Submit { email: String, password: String },
    OpenPage(&'static str),
}

/// Form state for the sign-in screen. `error` and `loading` are owned by
/// the app and mirrored in before each frame.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub show_password: bool,
    pub error: Option<String>,
    pub loading: bool,
}

impl LoginForm {
    pub fn new(email: String) -> Self {
        Self {
            email,
            ..Default::default()
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.email.trim().is_empty() && !self.password.is_empty()
    }

    /// Credentials to send, or None while a request is running or a field is empty
    pub fn submit(&mut self) -> Option<LoginAction> {
        if !self.can_submit() {
            return None;
        }
        Some(LoginAction::Submit {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Signing in..."
        } else {
            "Sign in"
        }
    }

    pub fn show(&mut self, ui: &mut Ui, palette: &Palette) -> Option<LoginAction> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.12);
            ui.label(
                RichText::new("Shiftboard")
                    .size(30.0)
                    .strong()
                    .color(palette.brand_accent),
            );
            ui.add_space(24.0);

            egui::Frame::none()
                .fill(Color32::from_rgb(20, 20, 18))
                .rounding(8.0)
                .inner_margin(egui::Margin::same(32.0))
                .show(ui, |ui| {
                    ui.set_width(360.0);
                    ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                        ui.label(RichText::new("Sign in").size(20.0).strong());
                        ui.add_space(8.0);

                        if let Some(error) = &self.error {
                            egui::Frame::none()
                                .fill(palette.error_fill)
                                .stroke(egui::Stroke::new(1.0, palette.error_border))
                                .rounding(6.0)
                                .inner_margin(egui::Margin::same(10.0))
                                .show(ui, |ui| {
                                    ui.set_width(ui.available_width());
                                    ui.label(RichText::new(error).color(palette.error_text));
                                });
                        }

                        ui.label("Email");
                        let email_response = ui.add(
                            egui::TextEdit::singleline(&mut self.email)
                                .hint_text("you@company.com")
                                .desired_width(f32::INFINITY),
                        );

                        ui.label("Password");
                        let mut password_response = None;
                        ui.horizontal(|ui| {
                            let toggle_width = 32.0;
                            password_response = Some(ui.add(
                                egui::TextEdit::singleline(&mut self.password)
                                    .password(!self.show_password)
                                    .desired_width(ui.available_width() - toggle_width),
                            ));
                            let icon = if self.show_password {
                                egui_phosphor::regular::EYE_SLASH
                            } else {
                                egui_phosphor::regular::EYE
                            };
                            if ui
                                .add(egui::Button::new(RichText::new(icon).size(16.0)).frame(false))
                                .on_hover_text(if self.show_password { "Hide password" } else { "Show password" })
                                .clicked()
                            {
                                self.show_password = !self.show_password;
                            }
                        });

                        let enter_pressed = ui.input(|i| i.key_pressed(egui::Key::Enter))
                            && (email_response.lost_focus()
                                || password_response.as_ref().is_some_and(|r| r.lost_focus()));

                        ui.add_space(8.0);
                        let button = egui::Button::new(
                            RichText::new(self.submit_label()).color(Color32::WHITE),
                        )
                        .fill(palette.brand_accent)
                        .min_size(egui::vec2(ui.available_width(), 36.0));

                        let clicked = ui.add_enabled(self.can_submit(), button).clicked();
                        if clicked || enter_pressed {
                            action = self.submit();
                        }

                        ui.vertical_centered(|ui| {
                            if ui.link("Forgot password?").clicked() {
                                action = Some(LoginAction::OpenPage("forgot-password"));
                            }
                        });
                    });
                });

            ui.add_space(24.0);
            ui.label(RichText::new("Don't have an account?").color(Color32::from_rgb(176, 176, 168)));
            if ui.link(RichText::new("Create Account").strong()).clicked() {
                action = Some(LoginAction::OpenPage("register"));
            }
        });

        action
    }
}
