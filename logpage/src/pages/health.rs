use crate::temperature::Kelvin;
use crate::wide::WideCounter;
use nvme_logpage_derive::LogRecord;
use std::io::Write;

/// Critical warning byte of the SMART / Health page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriticalWarning(pub u8);

impl CriticalWarning {
    pub fn available_spare(self) -> u8 {
        self.0 & 0x1
    }

    pub fn temperature(self) -> u8 {
        (self.0 >> 1) & 0x1
    }

    pub fn device_reliability(self) -> u8 {
        (self.0 >> 2) & 0x1
    }

    pub fn read_only(self) -> u8 {
        (self.0 >> 3) & 0x1
    }

    pub fn volatile_memory_backup(self) -> u8 {
        (self.0 >> 4) & 0x1
    }
}

/// SMART / Health Information log (page 0x02).
#[derive(Debug, Clone, Copy, LogRecord)]
#[record(size = 512)]
pub struct HealthInformation {
    critical_warning: u8,
    temperature: u16,
    available_spare: u8,
    available_spare_threshold: u8,
    percentage_used: u8,
    #[record(skip = 26)]
    data_units_read: WideCounter,
    data_units_written: WideCounter,
    host_read_commands: WideCounter,
    host_write_commands: WideCounter,
    controller_busy_time: WideCounter,
    power_cycles: WideCounter,
    power_on_hours: WideCounter,
    unsafe_shutdowns: WideCounter,
    media_errors: WideCounter,
    num_error_info_log_entries: WideCounter,
    warning_temp_time: u32,
    error_temp_time: u32,
    temp_sensor: [u16; 8],
}

impl HealthInformation {
    pub fn warning(&self) -> CriticalWarning {
        CriticalWarning(self.critical_warning)
    }

    /// Sensors that reported a reading, numbered from 1.
    pub fn sensors(&self) -> impl Iterator<Item = (usize, Kelvin)> + '_ {
        self.temp_sensor
            .iter()
            .enumerate()
            .filter(|(_, t)| **t != 0)
            .map(|(i, t)| (i + 1, Kelvin(*t)))
    }

    pub fn dump(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let warning = self.warning();

        writer.write_fmt(format_args!("SMART/Health Information Log\n"))?;
        writer.write_fmt(format_args!("============================\n"))?;

        writer.write_fmt(format_args!(
            "Critical Warning State:         0x{:02x}\n",
            warning.0
        ))?;
        writer.write_fmt(format_args!(
            " Available spare:               {}\n",
            warning.available_spare()
        ))?;
        writer.write_fmt(format_args!(
            " Temperature:                   {}\n",
            warning.temperature()
        ))?;
        writer.write_fmt(format_args!(
            " Device reliability:            {}\n",
            warning.device_reliability()
        ))?;
        writer.write_fmt(format_args!(
            " Read only:                     {}\n",
            warning.read_only()
        ))?;
        writer.write_fmt(format_args!(
            " Volatile memory backup:        {}\n",
            warning.volatile_memory_backup()
        ))?;
        writer.write_fmt(format_args!(
            "Temperature:                    {}\n",
            Kelvin(self.temperature)
        ))?;
        writer.write_fmt(format_args!(
            "Available spare:                {}\n",
            self.available_spare
        ))?;
        writer.write_fmt(format_args!(
            "Available spare threshold:      {}\n",
            self.available_spare_threshold
        ))?;
        writer.write_fmt(format_args!(
            "Percentage used:                {}\n",
            self.percentage_used
        ))?;

        let counters = [
            ("Data units (512,000 byte) read", self.data_units_read),
            ("Data units written", self.data_units_written),
            ("Host read commands", self.host_read_commands),
            ("Host write commands", self.host_write_commands),
            ("Controller busy time (minutes)", self.controller_busy_time),
            ("Power cycles", self.power_cycles),
            ("Power on hours", self.power_on_hours),
            ("Unsafe shutdowns", self.unsafe_shutdowns),
            ("Media errors", self.media_errors),
            ("No. error info log entries", self.num_error_info_log_entries),
        ];
        for (name, value) in counters {
            writer.write_fmt(format_args!("{:<31} {}\n", format!("{}:", name), value))?;
        }

        writer.write_fmt(format_args!(
            "Warning Temp Composite Time:    {}\n",
            self.warning_temp_time
        ))?;
        writer.write_fmt(format_args!(
            "Error Temp Composite Time:      {}\n",
            self.error_temp_time
        ))?;
        for (n, t) in self.sensors() {
            writer.write_fmt(format_args!(
                "{:<31} {}\n",
                format!("Temperature Sensor {}:", n),
                t
            ))?;
        }

        Ok(())
    }
}
