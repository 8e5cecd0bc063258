// Identifier catalogue for the Jaguar CAN protocol
//
// A message is addressed by (manufacturer, device type, api class, api index, device).
// Classes group related operations; indices select one operation within a class.

/// Manufacturer and device-type codes
pub const MANUFACTURER_SYS: u8 = 0;
pub const MANUFACTURER_TI: u8 = 2;
pub const DEVTYPE_SYS: u8 = 0;
pub const DEVTYPE_MOTORCTRL: u8 = 2;

/// Device number used for system broadcasts
pub const BROADCAST_DEVICE: u8 = 0;

/// API classes
pub const API_SYS: u8 = 0;
pub const API_VOLTAGE: u8 = 0;
pub const API_SPEED: u8 = 1;
pub const API_VOLTCOMP: u8 = 2;
pub const API_POSITION: u8 = 3;
pub const API_CURRENT: u8 = 4;
pub const API_STATUS: u8 = 5;
pub const API_CONFIG: u8 = 7;
pub const API_ACK: u8 = 8;

/// System control interface
pub mod sys {
    pub const HALT: u8 = 0;
    pub const RESET: u8 = 1;
    pub const ASSIGN: u8 = 2;
    pub const QUERY: u8 = 3;
    pub const HEARTBEAT: u8 = 5;
    pub const SYNC_UPDATE: u8 = 6;
    pub const FW_UPDATE: u8 = 7;
    pub const FW_VER: u8 = 8;
    pub const ENUMERATION: u8 = 9;
    pub const RESUME: u8 = 10;
}

/// Voltage control interface
pub mod voltage {
    pub const ENABLE: u8 = 0;
    pub const DISABLE: u8 = 1;
    pub const SET: u8 = 2;
    pub const RAMP: u8 = 3;
}

/// Speed control interface
pub mod speed {
    pub const ENABLE: u8 = 0;
    pub const DISABLE: u8 = 1;
    pub const SET: u8 = 2;
    pub const P: u8 = 3;
    pub const I: u8 = 4;
    pub const D: u8 = 5;
    pub const REF: u8 = 6;

    // Speed reference values
    pub const ENCODER_1CH: u8 = 0;
    pub const ENCODER_1CH_INV: u8 = 2;
    pub const ENCODER_QUAD: u8 = 3;
}

/// Voltage compensation control interface
pub mod voltcomp {
    pub const ENABLE: u8 = 0;
    pub const DISABLE: u8 = 1;
    pub const SET: u8 = 2;
    pub const RAMP: u8 = 3;
    pub const RATE: u8 = 4;
}

/// Position control interface
pub mod position {
    pub const ENABLE: u8 = 0;
    pub const DISABLE: u8 = 1;
    pub const SET: u8 = 2;
    pub const P: u8 = 3;
    pub const I: u8 = 4;
    pub const D: u8 = 5;
    pub const REF: u8 = 6;

    // Position reference values
    pub const ENCODER: u8 = 0;
    pub const POTENTIOMETER: u8 = 1;
}

/// Current control interface
pub mod current {
    pub const ENABLE: u8 = 0;
    pub const DISABLE: u8 = 1;
    pub const SET: u8 = 2;
    pub const P: u8 = 3;
    pub const I: u8 = 4;
    pub const D: u8 = 5;
}

/// Motor control status
pub mod status {
    pub const OUTPUT_PERCENT: u8 = 0;
    pub const BUS_VOLTAGE: u8 = 1;
    pub const CURRENT: u8 = 2;
    pub const TEMPERATURE: u8 = 3;
    pub const POSITION: u8 = 4;
    pub const SPEED: u8 = 5;
    pub const LIMIT: u8 = 6;
    pub const FAULT: u8 = 7;
    pub const POWER: u8 = 8;
    pub const MODE: u8 = 9;
    pub const OUTPUT_VOLTS: u8 = 10;

    // Limit flags (bit positions)
    pub const FORWARD_LIMIT_REACHED: u8 = 0;
    pub const REVERSE_LIMIT_REACHED: u8 = 1;

    // Fault flags (bit positions)
    pub const CURRENT_FAULT: u8 = 0;
    pub const TEMPERATURE_FAULT: u8 = 1;
    pub const BUS_VOLTAGE_FAULT: u8 = 2;

    // Control modes
    pub const MODE_VOLTAGE: u8 = 0;
    pub const MODE_CURRENT: u8 = 1;
    pub const MODE_SPEED: u8 = 2;
    pub const MODE_POSITION: u8 = 3;
    pub const MODE_VOLTCOMP: u8 = 4;
}

/// Motor control configuration
pub mod config {
    pub const BRUSHES: u8 = 0;
    pub const ENCODER_LINES: u8 = 1;
    pub const POT_TURNS: u8 = 2;
    pub const BRAKE_COAST: u8 = 3;
    pub const LIMIT_MODE: u8 = 4;
    pub const FORWARD_LIMIT: u8 = 5;
    pub const REVERSE_LIMIT: u8 = 6;
    pub const MAX_VOLTAGE: u8 = 7;
    pub const FAULT_TIME: u8 = 8;
}

/// One operation of the protocol: an (api class, api index) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub api_class: u8,
    pub api_index: u8,
}

impl Operation {
    pub const fn new(api_class: u8, api_index: u8) -> Self {
        Self {
            api_class,
            api_index,
        }
    }
}
