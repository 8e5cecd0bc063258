// Snapshot types returned by the driver and printed by the CLI

use serde::Serialize;

use crate::can::api::status;

/// All status values of one controller, in engineering units
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusReport {
    pub device: u8,
    pub output_percent: f32,
    pub bus_voltage: f32,
    pub current: f32,
    pub temperature: f32,
    pub position: f32,
    pub speed: f32,
    pub output_volts: f32,
    pub limit: LimitState,
    pub faults: Faults,
    pub power: u8,
    pub mode: ControlMode,
}

/// Limit switch state decoded from the limit status byte
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LimitState {
    pub forward_reached: bool,
    pub reverse_reached: bool,
}

impl From<u8> for LimitState {
    fn from(raw: u8) -> Self {
        Self {
            forward_reached: raw & (1 << status::FORWARD_LIMIT_REACHED) != 0,
            reverse_reached: raw & (1 << status::REVERSE_LIMIT_REACHED) != 0,
        }
    }
}

/// Fault flags decoded from the fault status byte
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Faults {
    pub current: bool,
    pub temperature: bool,
    pub bus_voltage: bool,
}

impl From<u8> for Faults {
    fn from(raw: u8) -> Self {
        Self {
            current: raw & (1 << status::CURRENT_FAULT) != 0,
            temperature: raw & (1 << status::TEMPERATURE_FAULT) != 0,
            bus_voltage: raw & (1 << status::BUS_VOLTAGE_FAULT) != 0,
        }
    }
}

impl Faults {
    pub fn any(&self) -> bool {
        self.current || self.temperature || self.bus_voltage
    }
}

/// Active control mode
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Voltage,
    Current,
    Speed,
    Position,
    VoltageCompensation,
    Unknown(u8),
}

impl From<u8> for ControlMode {
    fn from(raw: u8) -> Self {
        match raw {
            status::MODE_VOLTAGE => ControlMode::Voltage,
            status::MODE_CURRENT => ControlMode::Current,
            status::MODE_SPEED => ControlMode::Speed,
            status::MODE_POSITION => ControlMode::Position,
            status::MODE_VOLTCOMP => ControlMode::VoltageCompensation,
            other => ControlMode::Unknown(other),
        }
    }
}

/// Firmware and identity of one device
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device: u8,
    pub firmware_version: u32,
}
