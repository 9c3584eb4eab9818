use std::time::Duration;

use client_core::ExchangeState;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::UserSlot;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiEvent, UserIntent},
        orchestration::handle_user_intent,
        reducer::apply_ui_event,
    },
    ui::panel::show_user_panel,
};

pub struct ExchangeApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: ExchangeState,
    bridge_status: Option<String>,
}

impl ExchangeApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        state: ExchangeState,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state,
            bridge_status: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.state, &mut self.bridge_status, event);
        }
    }

    fn busy(&self) -> bool {
        self.state
            .panels()
            .any(|panel| panel.sends_in_flight() + panel.receives_in_flight() > 0)
    }
}

impl eframe::App for ExchangeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut intents: Vec<(UserSlot, UserIntent)> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(status) = &self.bridge_status {
                ui.colored_label(egui::Color32::RED, status);
                ui.separator();
            }
            ui.columns(2, |columns| {
                for (column, panel) in columns.iter_mut().zip(self.state.panels()) {
                    let slot = panel.slot();
                    intents.extend(
                        show_user_panel(column, panel)
                            .into_iter()
                            .map(|intent| (slot, intent)),
                    );
                }
            });
        });

        for (slot, intent) in intents {
            handle_user_intent(&self.cmd_tx, &mut self.state, slot, intent);
        }

        let repaint_after = if self.busy() {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(100)
        };
        ctx.request_repaint_after(repaint_after);
    }
}
