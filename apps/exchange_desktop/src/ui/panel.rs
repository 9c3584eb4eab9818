//! One user's side of the exchange window.

use client_core::UserPanelState;
use eframe::egui;

use crate::controller::events::UserIntent;

const ACK_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 139, 87);

/// Draws the panel and returns whatever the user asked for this frame.
pub fn show_user_panel(ui: &mut egui::Ui, panel: &UserPanelState) -> Vec<UserIntent> {
    let mut intents = Vec::new();
    let slot = panel.slot();

    ui.heading(slot.label());
    ui.add_space(6.0);

    let mut draft = panel.draft().to_string();
    let response = ui.add(
        egui::TextEdit::multiline(&mut draft)
            .id_salt(("draft", slot.index()))
            .hint_text("Enter your message...")
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        intents.push(UserIntent::EditDraft(draft));
    }

    ui.horizontal(|ui| {
        if ui
            .button(format!("Send Message to {}", slot.peer()))
            .clicked()
        {
            intents.push(UserIntent::Send);
        }
        if ui.button("Retrieve Messages").clicked() {
            intents.push(UserIntent::RefreshInbox);
        }
        if panel.sends_in_flight() + panel.receives_in_flight() > 0 {
            ui.spinner();
        }
    });

    if let Some(ack) = panel.acknowledgement() {
        ui.horizontal_wrapped(|ui| {
            ui.colored_label(ACK_COLOR, ack);
            if ui.small_button("Dismiss").clicked() {
                intents.push(UserIntent::DismissAcknowledgement);
            }
        });
    }

    if let Some(error) = panel.error() {
        ui.colored_label(egui::Color32::RED, error.message())
            .on_hover_text(error.cause().to_string());
    }

    ui.separator();
    ui.label(egui::RichText::new("Inbox").strong());
    egui::ScrollArea::vertical()
        .id_salt(("inbox", slot.index()))
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if panel.inbox().is_empty() {
                ui.weak("No messages found.");
            }
            for message in panel.inbox() {
                ui.label(message);
                ui.separator();
            }
        });

    intents
}
