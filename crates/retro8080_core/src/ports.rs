/// Receives the CPU's `IN` and `OUT` traffic.
///
/// The core only forwards the port number (and, for `OUT`, the accumulator);
/// what a port means is up to the machine plugging in here. Whatever `input`
/// returns is loaded into A as-is.
pub trait PortHandler {
    fn input(&mut self, port: u8) -> u8;
    fn output(&mut self, port: u8, value: u8);
}

impl<P: PortHandler + ?Sized> PortHandler for Box<P> {
    fn input(&mut self, port: u8) -> u8 {
        (**self).input(port)
    }

    fn output(&mut self, port: u8, value: u8) {
        (**self).output(port, value)
    }
}

/// Port handler with nothing attached: reads float to zero, writes vanish.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPorts;

impl PortHandler for NullPorts {
    fn input(&mut self, port: u8) -> u8 {
        log::trace!("IN {port:#04x} from unconnected port");
        0
    }

    fn output(&mut self, port: u8, value: u8) {
        log::trace!("OUT {port:#04x} <- {value:#04x} to unconnected port");
    }
}
