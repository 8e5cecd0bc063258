// High-level Jaguar driver
//
// Each controller operation is one generic exchange parameterized by its
// (api class, api index), the payload type it sends and the reply type it
// reads back. Values are converted to and from the controller's fixed-point
// formats here.

use tracing::{debug, info, warn};

use super::connection::{ByteChannel, Connection, SerialChannel};
use super::exchange::{DecodeReply, EncodePayload};
use super::report::{DeviceInfo, StatusReport};
use crate::can::api::{
    API_CONFIG, API_CURRENT, API_POSITION, API_SPEED, API_STATUS, API_VOLTAGE, API_VOLTCOMP,
    Operation, config, current, position, speed, status, sys, voltage, voltcomp,
};
use crate::can::fixed::{
    f32_to_fixed16, f32_to_sfixed16, f32_to_sfixed32, fixed16_to_f32, sfixed16_to_f32,
    sfixed32_to_f32,
};
use crate::can::{CodecError, DEVICE_LIMIT};
use crate::config::LinkConfig;
use crate::error::{JaguarError, Result};

/// Full-scale raw voltage command
const VOLTAGE_FULL_SCALE: f32 = 32767.0;

/// Convert a -1.0..=1.0 output fraction to the raw voltage command
fn fraction_to_raw(fraction: f32) -> i16 {
    (fraction.clamp(-1.0, 1.0) * VOLTAGE_FULL_SCALE).round() as i16
}

fn raw_to_fraction(raw: i16) -> f32 {
    (raw as f32 / VOLTAGE_FULL_SCALE).clamp(-1.0, 1.0)
}

/// Typed command set for Jaguar controllers on one serial link
pub struct JaguarDriver<C: ByteChannel = SerialChannel> {
    link: Connection<C>,
    // (device, control class) pairs enabled through this driver
    active: Vec<(u8, u8)>,
}

impl JaguarDriver<SerialChannel> {
    /// Open the serial link described by `config`
    pub fn open(config: &LinkConfig) -> Result<Self> {
        Ok(Self::new(Connection::open(config)?))
    }
}

impl<C: ByteChannel> JaguarDriver<C> {
    pub fn new(link: Connection<C>) -> Self {
        Self {
            link,
            active: Vec::new(),
        }
    }

    /// The underlying connection, for raw exchanges
    pub fn connection(&mut self) -> &mut Connection<C> {
        &mut self.link
    }

    fn set<P: EncodePayload + ?Sized>(
        &mut self,
        device: u8,
        api_class: u8,
        api_index: u8,
        value: &P,
    ) -> Result<()> {
        self.link
            .command(device, Operation::new(api_class, api_index), value)
    }

    fn get<R: DecodeReply>(&mut self, device: u8, api_class: u8, api_index: u8) -> Result<R> {
        self.link
            .query(device, Operation::new(api_class, api_index), &())
    }

    fn enable_mode<P: EncodePayload + ?Sized>(
        &mut self,
        device: u8,
        api_class: u8,
        payload: &P,
    ) -> Result<()> {
        // every control class uses index 0 for enable
        self.set(device, api_class, voltage::ENABLE, payload)?;
        if !self.active.contains(&(device, api_class)) {
            self.active.push((device, api_class));
        }
        info!("Device {}: enabled control class {}", device, api_class);
        Ok(())
    }

    fn disable_mode(&mut self, device: u8, api_class: u8) -> Result<()> {
        self.set(device, api_class, voltage::DISABLE, &())?;
        self.active.retain(|&entry| entry != (device, api_class));
        info!("Device {}: disabled control class {}", device, api_class);
        Ok(())
    }

    // === System ===

    /// Halt all controllers (motors go to neutral until resumed)
    pub fn halt(&mut self) -> Result<()> {
        info!("Broadcasting halt");
        self.link.broadcast(sys::HALT, &())
    }

    pub fn reset(&mut self) -> Result<()> {
        info!("Broadcasting reset");
        self.link.broadcast(sys::RESET, &())
    }

    pub fn resume(&mut self) -> Result<()> {
        info!("Broadcasting resume");
        self.link.broadcast(sys::RESUME, &())
    }

    pub fn heartbeat(&mut self) -> Result<()> {
        self.link.broadcast(sys::HEARTBEAT, &())
    }

    /// Apply pending set-points of every device in the given sync groups
    pub fn sync_update(&mut self, groups: u8) -> Result<()> {
        self.link.broadcast(sys::SYNC_UPDATE, &groups)
    }

    /// Offer a new device number; the controller takes it when its button is pressed
    pub fn assign(&mut self, device: u8) -> Result<()> {
        if device >= DEVICE_LIMIT {
            return Err(JaguarError::InvalidRequest(CodecError::FieldOutOfRange {
                field: "device",
                value: device,
                max: DEVICE_LIMIT - 1,
            }));
        }
        self.link.broadcast(sys::ASSIGN, &device)
    }

    pub fn firmware_version(&mut self, device: u8) -> Result<u32> {
        self.link.system_query(device, sys::FW_VER, &())
    }

    /// Device type and manufacturer reported by a device
    pub fn query_device(&mut self, device: u8) -> Result<(u8, u8)> {
        self.link.system_query(device, sys::QUERY, &())
    }

    pub fn device_info(&mut self, device: u8) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            device,
            firmware_version: self.firmware_version(device)?,
        })
    }

    // === Voltage control ===

    pub fn voltage_enable(&mut self, device: u8) -> Result<()> {
        self.enable_mode(device, API_VOLTAGE, &())
    }

    pub fn voltage_disable(&mut self, device: u8) -> Result<()> {
        self.disable_mode(device, API_VOLTAGE)
    }

    /// Set output as a fraction of bus voltage (-1.0..=1.0)
    pub fn voltage_set(&mut self, device: u8, fraction: f32) -> Result<()> {
        debug!("Device {}: voltage set {:.3}", device, fraction);
        self.set(device, API_VOLTAGE, voltage::SET, &fraction_to_raw(fraction))
    }

    /// Ramp rate in raw output units per millisecond (0 disables ramping)
    pub fn voltage_ramp(&mut self, device: u8, rate: u16) -> Result<()> {
        self.set(device, API_VOLTAGE, voltage::RAMP, &rate)
    }

    // === Speed control ===

    pub fn speed_enable(&mut self, device: u8) -> Result<()> {
        self.enable_mode(device, API_SPEED, &())
    }

    pub fn speed_disable(&mut self, device: u8) -> Result<()> {
        self.disable_mode(device, API_SPEED)
    }

    /// Target speed in rpm
    pub fn speed_set(&mut self, device: u8, rpm: f32) -> Result<()> {
        debug!("Device {}: speed set {:.2} rpm", device, rpm);
        self.set(device, API_SPEED, speed::SET, &f32_to_sfixed32(rpm))
    }

    pub fn speed_p(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_SPEED, speed::P, &f32_to_sfixed32(gain))
    }

    pub fn speed_i(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_SPEED, speed::I, &f32_to_sfixed32(gain))
    }

    pub fn speed_d(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_SPEED, speed::D, &f32_to_sfixed32(gain))
    }

    /// Speed sensor, one of `speed::ENCODER_*`
    pub fn speed_reference(&mut self, device: u8, reference: u8) -> Result<()> {
        self.set(device, API_SPEED, speed::REF, &reference)
    }

    // === Voltage compensation control ===

    pub fn voltcomp_enable(&mut self, device: u8) -> Result<()> {
        self.enable_mode(device, API_VOLTCOMP, &())
    }

    pub fn voltcomp_disable(&mut self, device: u8) -> Result<()> {
        self.disable_mode(device, API_VOLTCOMP)
    }

    /// Target output in volts
    pub fn voltcomp_set(&mut self, device: u8, volts: f32) -> Result<()> {
        self.set(device, API_VOLTCOMP, voltcomp::SET, &f32_to_sfixed16(volts))
    }

    /// Ramp of the set-point in volts per millisecond
    pub fn voltcomp_ramp(&mut self, device: u8, volts_per_ms: f32) -> Result<()> {
        self.set(device, API_VOLTCOMP, voltcomp::RAMP, &f32_to_fixed16(volts_per_ms))
    }

    /// Compensation rate in volts per millisecond
    pub fn voltcomp_rate(&mut self, device: u8, volts_per_ms: f32) -> Result<()> {
        self.set(device, API_VOLTCOMP, voltcomp::RATE, &f32_to_fixed16(volts_per_ms))
    }

    // === Position control ===

    /// Enable position control, taking `initial` (revolutions) as the current position
    pub fn position_enable(&mut self, device: u8, initial: f32) -> Result<()> {
        self.enable_mode(device, API_POSITION, &f32_to_sfixed32(initial))
    }

    pub fn position_disable(&mut self, device: u8) -> Result<()> {
        self.disable_mode(device, API_POSITION)
    }

    /// Target position in revolutions
    pub fn position_set(&mut self, device: u8, revolutions: f32) -> Result<()> {
        debug!("Device {}: position set {:.3} rev", device, revolutions);
        self.set(device, API_POSITION, position::SET, &f32_to_sfixed32(revolutions))
    }

    pub fn position_p(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_POSITION, position::P, &f32_to_sfixed32(gain))
    }

    pub fn position_i(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_POSITION, position::I, &f32_to_sfixed32(gain))
    }

    pub fn position_d(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_POSITION, position::D, &f32_to_sfixed32(gain))
    }

    /// Position sensor, `position::ENCODER` or `position::POTENTIOMETER`
    pub fn position_reference(&mut self, device: u8, reference: u8) -> Result<()> {
        self.set(device, API_POSITION, position::REF, &reference)
    }

    // === Current control ===

    pub fn current_enable(&mut self, device: u8) -> Result<()> {
        self.enable_mode(device, API_CURRENT, &())
    }

    pub fn current_disable(&mut self, device: u8) -> Result<()> {
        self.disable_mode(device, API_CURRENT)
    }

    /// Target current in amps
    pub fn current_set(&mut self, device: u8, amps: f32) -> Result<()> {
        self.set(device, API_CURRENT, current::SET, &f32_to_sfixed16(amps))
    }

    pub fn current_p(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_CURRENT, current::P, &f32_to_sfixed32(gain))
    }

    pub fn current_i(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_CURRENT, current::I, &f32_to_sfixed32(gain))
    }

    pub fn current_d(&mut self, device: u8, gain: f32) -> Result<()> {
        self.set(device, API_CURRENT, current::D, &f32_to_sfixed32(gain))
    }

    // === Status ===

    /// Output as a fraction of bus voltage
    pub fn output_percent(&mut self, device: u8) -> Result<f32> {
        let raw: i16 = self.get(device, API_STATUS, status::OUTPUT_PERCENT)?;
        Ok(raw_to_fraction(raw))
    }

    /// Bus voltage in volts
    pub fn bus_voltage(&mut self, device: u8) -> Result<f32> {
        let raw: u16 = self.get(device, API_STATUS, status::BUS_VOLTAGE)?;
        Ok(fixed16_to_f32(raw))
    }

    /// Motor current in amps
    pub fn current(&mut self, device: u8) -> Result<f32> {
        let raw: i16 = self.get(device, API_STATUS, status::CURRENT)?;
        Ok(sfixed16_to_f32(raw))
    }

    /// Ambient temperature in degrees Celsius
    pub fn temperature(&mut self, device: u8) -> Result<f32> {
        let raw: u16 = self.get(device, API_STATUS, status::TEMPERATURE)?;
        Ok(fixed16_to_f32(raw))
    }

    /// Position in revolutions
    pub fn position(&mut self, device: u8) -> Result<f32> {
        let raw: i32 = self.get(device, API_STATUS, status::POSITION)?;
        Ok(sfixed32_to_f32(raw))
    }

    /// Speed in rpm
    pub fn speed(&mut self, device: u8) -> Result<f32> {
        let raw: i32 = self.get(device, API_STATUS, status::SPEED)?;
        Ok(sfixed32_to_f32(raw))
    }

    pub fn limit(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_STATUS, status::LIMIT)
    }

    pub fn fault(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_STATUS, status::FAULT)
    }

    pub fn power(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_STATUS, status::POWER)
    }

    pub fn mode(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_STATUS, status::MODE)
    }

    /// Output voltage in volts
    pub fn output_volts(&mut self, device: u8) -> Result<f32> {
        let raw: i16 = self.get(device, API_STATUS, status::OUTPUT_VOLTS)?;
        Ok(sfixed16_to_f32(raw))
    }

    /// Read every status value, one query at a time
    pub fn read_status(&mut self, device: u8) -> Result<StatusReport> {
        Ok(StatusReport {
            device,
            output_percent: self.output_percent(device)?,
            bus_voltage: self.bus_voltage(device)?,
            current: self.current(device)?,
            temperature: self.temperature(device)?,
            position: self.position(device)?,
            speed: self.speed(device)?,
            output_volts: self.output_volts(device)?,
            limit: self.limit(device)?.into(),
            faults: self.fault(device)?.into(),
            power: self.power(device)?,
            mode: self.mode(device)?.into(),
        })
    }

    // === Configuration ===

    pub fn set_brushes(&mut self, device: u8, brushes: u8) -> Result<()> {
        self.set(device, API_CONFIG, config::BRUSHES, &brushes)
    }

    pub fn brushes(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_CONFIG, config::BRUSHES)
    }

    pub fn set_encoder_lines(&mut self, device: u8, lines: u16) -> Result<()> {
        self.set(device, API_CONFIG, config::ENCODER_LINES, &lines)
    }

    pub fn encoder_lines(&mut self, device: u8) -> Result<u16> {
        self.get(device, API_CONFIG, config::ENCODER_LINES)
    }

    pub fn set_pot_turns(&mut self, device: u8, turns: u16) -> Result<()> {
        self.set(device, API_CONFIG, config::POT_TURNS, &turns)
    }

    pub fn pot_turns(&mut self, device: u8) -> Result<u16> {
        self.get(device, API_CONFIG, config::POT_TURNS)
    }

    /// 0 = use jumper, 1 = brake, 2 = coast
    pub fn set_brake_coast(&mut self, device: u8, setting: u8) -> Result<()> {
        self.set(device, API_CONFIG, config::BRAKE_COAST, &setting)
    }

    pub fn brake_coast(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_CONFIG, config::BRAKE_COAST)
    }

    pub fn set_limit_mode(&mut self, device: u8, mode: u8) -> Result<()> {
        self.set(device, API_CONFIG, config::LIMIT_MODE, &mode)
    }

    pub fn limit_mode(&mut self, device: u8) -> Result<u8> {
        self.get(device, API_CONFIG, config::LIMIT_MODE)
    }

    /// Soft forward limit in revolutions
    pub fn set_forward_limit(&mut self, device: u8, revolutions: f32) -> Result<()> {
        self.set(device, API_CONFIG, config::FORWARD_LIMIT, &f32_to_sfixed32(revolutions))
    }

    pub fn forward_limit(&mut self, device: u8) -> Result<f32> {
        let raw: i32 = self.get(device, API_CONFIG, config::FORWARD_LIMIT)?;
        Ok(sfixed32_to_f32(raw))
    }

    /// Soft reverse limit in revolutions
    pub fn set_reverse_limit(&mut self, device: u8, revolutions: f32) -> Result<()> {
        self.set(device, API_CONFIG, config::REVERSE_LIMIT, &f32_to_sfixed32(revolutions))
    }

    pub fn reverse_limit(&mut self, device: u8) -> Result<f32> {
        let raw: i32 = self.get(device, API_CONFIG, config::REVERSE_LIMIT)?;
        Ok(sfixed32_to_f32(raw))
    }

    /// Maximum output voltage in volts
    pub fn set_max_voltage(&mut self, device: u8, volts: f32) -> Result<()> {
        self.set(device, API_CONFIG, config::MAX_VOLTAGE, &f32_to_fixed16(volts))
    }

    pub fn max_voltage(&mut self, device: u8) -> Result<f32> {
        let raw: u16 = self.get(device, API_CONFIG, config::MAX_VOLTAGE)?;
        Ok(fixed16_to_f32(raw))
    }

    /// Time a fault condition is held, in milliseconds
    pub fn set_fault_time(&mut self, device: u8, millis: u16) -> Result<()> {
        self.set(device, API_CONFIG, config::FAULT_TIME, &millis)
    }

    pub fn fault_time(&mut self, device: u8) -> Result<u16> {
        self.get(device, API_CONFIG, config::FAULT_TIME)
    }
}

impl<C: ByteChannel> Drop for JaguarDriver<C> {
    fn drop(&mut self) {
        // Disable every control mode this driver enabled
        for (device, api_class) in std::mem::take(&mut self.active) {
            if let Err(e) = self.set(device, api_class, voltage::DISABLE, &()) {
                warn!(
                    "Failed to disable control class {} on device {} on drop: {}",
                    api_class, device, e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::can::api::API_ACK;
    use crate::can::{CanMessage, codec};
    use crate::jaguar::testing::MockChannel;

    fn ack(device: u8) -> CanMessage {
        CanMessage::motor_controller(device, Operation::new(API_ACK, 0), &[]).unwrap()
    }

    fn reply(device: u8, api_class: u8, api_index: u8, payload: &[u8]) -> CanMessage {
        CanMessage::motor_controller(device, Operation::new(api_class, api_index), payload)
            .unwrap()
    }

    fn sent(channel: &MockChannel) -> Vec<CanMessage> {
        let mut conn = Connection::new(MockChannel::with_input(channel.written()));
        let mut frames = Vec::new();
        while let Ok(message) = conn.receive_message() {
            frames.push(message);
        }
        frames
    }

    #[test]
    fn test_fraction_conversion() {
        assert_eq!(fraction_to_raw(1.0), 32767);
        assert_eq!(fraction_to_raw(-2.0), -32767);
        assert_eq!(fraction_to_raw(0.5), 16384);
        assert_eq!(raw_to_fraction(-32768), -1.0);
    }

    #[test]
    fn test_voltage_set_payload() {
        let mut driver = JaguarDriver::new(Connection::new(MockChannel::with_replies(&[ack(4)])));
        driver.voltage_set(4, -0.5).unwrap();

        let frames = sent(driver.connection().get_ref());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].operation(), Operation::new(API_VOLTAGE, voltage::SET));
        assert_eq!(frames[0].payload(), &(-16384i16).to_le_bytes());
    }

    #[test]
    fn test_speed_set_uses_16_16() {
        let mut driver = JaguarDriver::new(Connection::new(MockChannel::with_replies(&[ack(2)])));
        driver.speed_set(2, 1.5).unwrap();

        let frames = sent(driver.connection().get_ref());
        assert_eq!(frames[0].payload(), &[0x00, 0x80, 0x01, 0x00]);
    }

    #[test]
    fn test_speed_enable_then_reference() {
        let mut driver =
            JaguarDriver::new(Connection::new(MockChannel::with_replies(&[ack(2), ack(2)])));
        driver.speed_enable(2).unwrap();
        driver.speed_reference(2, speed::ENCODER_QUAD).unwrap();

        let frames = sent(driver.connection().get_ref());
        assert_eq!(frames[0].operation(), Operation::new(API_SPEED, speed::ENABLE));
        assert!(frames[0].payload().is_empty());
        assert_eq!(frames[1].operation(), Operation::new(API_SPEED, speed::REF));
        assert_eq!(frames[1].payload(), &[speed::ENCODER_QUAD]);
        // forget the enable so drop sends nothing more
        driver.active.clear();
    }

    #[test]
    fn test_bus_voltage_query() {
        let replies = [reply(6, API_STATUS, status::BUS_VOLTAGE, &[0x80, 0x0C]), ack(6)];
        let mut driver = JaguarDriver::new(Connection::new(MockChannel::with_replies(&replies)));
        assert_eq!(driver.bus_voltage(6).unwrap(), 12.5);
    }

    #[test]
    fn test_reply_for_other_operation_is_protocol_failure() {
        let replies = [reply(6, API_STATUS, status::CURRENT, &[0x80, 0x0C]), ack(6)];
        let mut driver = JaguarDriver::new(Connection::new(MockChannel::with_replies(&replies)));
        let err = driver.bus_voltage(6).unwrap_err();
        assert!(matches!(err, JaguarError::Protocol(_)));
    }

    #[test]
    fn test_read_status() {
        let mut replies = Vec::new();
        let values: [(u8, &[u8]); 11] = [
            (status::OUTPUT_PERCENT, &[0xFF, 0x7F]),
            (status::BUS_VOLTAGE, &[0x00, 0x0C]),
            (status::CURRENT, &[0x80, 0xFE]),
            (status::TEMPERATURE, &[0x40, 0x19]),
            (status::POSITION, &[0x00, 0x00, 0x02, 0x00]),
            (status::SPEED, &[0x00, 0x00, 0x9C, 0xFF]),
            (status::OUTPUT_VOLTS, &[0x00, 0x06]),
            (status::LIMIT, &[0x01]),
            (status::FAULT, &[0x00]),
            (status::POWER, &[0x01]),
            (status::MODE, &[status::MODE_SPEED]),
        ];
        for (index, payload) in values {
            replies.push(reply(1, API_STATUS, index, payload));
            replies.push(ack(1));
        }

        let mut driver = JaguarDriver::new(Connection::new(MockChannel::with_replies(&replies)));
        let report = driver.read_status(1).unwrap();
        assert_eq!(report.output_percent, 1.0);
        assert_eq!(report.bus_voltage, 12.0);
        assert_eq!(report.current, -1.5);
        assert_eq!(report.temperature, 25.25);
        assert_eq!(report.position, 2.0);
        assert_eq!(report.speed, -100.0);
        assert_eq!(report.output_volts, 6.0);
        assert!(report.limit.forward_reached);
        assert!(!report.faults.any());
        assert_eq!(report.mode, crate::jaguar::ControlMode::Speed);
        assert_eq!(driver.connection().get_ref().remaining(), 0);
    }

    #[test]
    fn test_firmware_version_system_query() {
        let fw = CanMessage::system(3, Operation::new(0, sys::FW_VER), &[0x6B, 0x00, 0x00, 0x00])
            .unwrap();
        let mut driver =
            JaguarDriver::new(Connection::new(MockChannel::with_replies(&[fw, ack(3)])));
        assert_eq!(driver.firmware_version(3).unwrap(), 107);
    }

    #[test]
    fn test_assign_rejects_out_of_range() {
        let mut driver = JaguarDriver::new(Connection::new(MockChannel::new()));
        assert!(driver.assign(64).unwrap_err().is_invalid_request());
        driver.assign(12).unwrap();
        let frames = sent(driver.connection().get_ref());
        assert_eq!(frames[0].payload(), &[12]);
        assert_eq!(frames[0].device, 0);
    }

    #[test]
    fn test_drop_disables_enabled_modes() {
        let mut channel = MockChannel::with_replies(&[ack(7), ack(7), ack(7)]);
        {
            let mut driver = JaguarDriver::new(Connection::new(&mut channel));
            driver.voltage_enable(7).unwrap();
            driver.voltage_set(7, 0.25).unwrap();
        }

        let frames = sent(&channel);
        let ops: Vec<_> = frames.iter().map(|m| m.operation()).collect();
        assert_eq!(
            ops,
            vec![
                Operation::new(API_VOLTAGE, voltage::ENABLE),
                Operation::new(API_VOLTAGE, voltage::SET),
                Operation::new(API_VOLTAGE, voltage::DISABLE),
            ]
        );
        assert_eq!(channel.remaining(), 0);
    }

    #[test]
    fn test_explicit_disable_clears_drop_list() {
        let mut channel = MockChannel::with_replies(&[ack(7), ack(7)]);
        {
            let mut driver = JaguarDriver::new(Connection::new(&mut channel));
            driver.speed_enable(7).unwrap();
            driver.speed_disable(7).unwrap();
        }
        assert_eq!(sent(&channel).len(), 2);
        assert!(codec::decode(&channel.written()[..6]).is_ok());
    }
}
