#![allow(dead_code)]

use std::collections::VecDeque;

use dw1000_ccp::{
    mac,
    BlinkHeader,
    Ccp,
    CcpConfig,
    Instant,
    Register,
    Transceiver,
    TxStart,
};
use embedded_hal::timer::{Cancel, CountDown};
use void::Void;


pub const MASTER: mac::ExtendedAddress = mac::ExtendedAddress(0x0102_0304_0506_0708);


#[derive(Debug, PartialEq)]
pub struct MockError;


/// Records everything the engine does with the radio
#[derive(Debug, Default)]
pub struct MockRadio {
    pub sys_time: u64,

    pub tx_buffer:         Vec<u8>,
    pub fctrl:             Option<(u16, u16, bool)>,
    pub wait_for_response: Option<bool>,
    pub delay_starts:      Vec<u64>,
    pub sent:              Vec<Vec<u8>>,

    /// Results of upcoming `start_tx` calls. `Started`, once empty.
    pub start_results: VecDeque<TxStart>,
    /// How often `wait_tx` reports `WouldBlock` before completing
    pub completion_delay: u32,
    pub tx_in_flight:     bool,
    pub busy_polls:       u32,

    pub rx_buffer: Vec<u8>,
    pub rx_time:   u64,
    pub ttcki:     u64,
    pub ttcko:     u64,

    pub fail_write: bool,
    pub fail_wait:  bool,
}

impl MockRadio {
    pub fn new(sys_time: u64) -> Self {
        MockRadio {
            sys_time,
            ttcki: 1_000_000,
            ..MockRadio::default()
        }
    }

    /// Prepares the receive side for a blink
    pub fn receive(&mut self, seq_num: u8, long_address: u64, rx_time: u64) {
        let header = BlinkHeader {
            fctrl: 0xC2,
            seq_num,
            long_address,
        };

        let mut buffer = [0; BlinkHeader::LEN];
        header.encode(&mut buffer).unwrap();

        self.rx_buffer = buffer.to_vec();
        self.rx_time   = rx_time;
    }

    /// Sequence numbers of all sent blinks
    pub fn sent_seq_nums(&self) -> Vec<u8> {
        self.sent.iter().map(|frame| frame[1]).collect()
    }
}

impl Transceiver for MockRadio {
    type Error = MockError;

    fn write_tx(&mut self, data: &[u8], offset: u16) -> Result<(), MockError> {
        if self.fail_write {
            return Err(MockError);
        }

        let offset = offset as usize;
        self.tx_buffer.resize(offset + data.len(), 0);
        self.tx_buffer[offset..].copy_from_slice(data);

        Ok(())
    }

    fn write_tx_fctrl(&mut self, len: u16, offset: u16, ranging: bool)
        -> Result<(), MockError>
    {
        self.fctrl = Some((len, offset, ranging));
        Ok(())
    }

    fn set_wait_for_response(&mut self, enable: bool) -> Result<(), MockError> {
        self.wait_for_response = Some(enable);
        Ok(())
    }

    fn set_delay_start(&mut self, time: Instant) -> Result<(), MockError> {
        self.delay_starts.push(time.value());
        Ok(())
    }

    fn start_tx(&mut self) -> Result<TxStart, MockError> {
        let result = self.start_results.pop_front()
            .unwrap_or(TxStart::Started);

        if result == TxStart::Started {
            self.sent.push(self.tx_buffer.clone());
            self.tx_in_flight = true;
            self.busy_polls   = self.completion_delay;
        }

        Ok(result)
    }

    fn wait_tx(&mut self) -> nb::Result<(), MockError> {
        if self.fail_wait {
            return Err(nb::Error::Other(MockError));
        }
        if !self.tx_in_flight {
            return Err(nb::Error::WouldBlock);
        }
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return Err(nb::Error::WouldBlock);
        }

        self.tx_in_flight = false;
        Ok(())
    }

    fn read_rx(&mut self, buffer: &mut [u8], offset: u16) -> Result<(), MockError> {
        let offset = offset as usize;
        buffer.copy_from_slice(&self.rx_buffer[offset..offset + buffer.len()]);
        Ok(())
    }

    fn read_rx_time(&mut self) -> Result<Instant, MockError> {
        Ok(Instant::truncate(self.rx_time))
    }

    fn read_sys_time(&mut self) -> Result<Instant, MockError> {
        Ok(Instant::truncate(self.sys_time))
    }

    fn read_reg(&mut self, register: Register, _offset: u16, _len: usize)
        -> Result<u64, MockError>
    {
        match register {
            Register::RxTtcki => Ok(self.ttcki),
            Register::RxTtcko => Ok(self.ttcko),
        }
    }
}


/// A timer that only expires when told to
#[derive(Debug, Default)]
pub struct MockTimer {
    pub starts:  Vec<u32>,
    pub running: bool,
    pub expired: bool,
}

impl MockTimer {
    pub fn expire(&mut self) {
        if self.running {
            self.expired = true;
        }
    }
}

impl CountDown for MockTimer {
    type Time = u32;

    fn start<T>(&mut self, count: T) where T: Into<u32> {
        self.starts.push(count.into());
        self.running = true;
        self.expired = false;
    }

    fn wait(&mut self) -> nb::Result<(), Void> {
        if self.expired {
            self.expired = false;
            self.running = false;
            return Ok(());
        }
        Err(nb::Error::WouldBlock)
    }
}

impl Cancel for MockTimer {
    type Error = ();

    fn cancel(&mut self) -> Result<(), ()> {
        if !self.running {
            return Err(());
        }
        self.running = false;
        self.expired = false;
        Ok(())
    }
}


pub type TestCcp<'a> = Ccp<'a, MockRadio, MockTimer>;


/// 1 MHz timer, rearmed 100 ticks after each blink
pub fn config(period: u32) -> CcpConfig {
    CcpConfig {
        period,
        os_latency:          period.saturating_sub(100),
        os_ticks_per_second: 1_000_000,
        local_address:       mac::ShortAddress(0x1234),
    }
}

pub fn initialized(n_frames: u16, period: u32, radio: &mut MockRadio)
    -> TestCcp<'static>
{
    let mut ccp = Ccp::new(MockTimer::default(), config(period));
    ccp.init(radio, n_frames, MASTER).unwrap();
    ccp
}

/// The period in DW1000 ticks
pub fn ticks(period: u32) -> u64 {
    (period as u64) << 15
}
