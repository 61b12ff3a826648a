use std::time::Duration;

use char_unit::devices::{PulseController, PulseEvent};
use char_unit::hardware::VirtualBoard;

#[tokio::main]
async fn main() {
    let board = VirtualBoard::new("virtual").with_pins(["11", "12"]);
    let controller = PulseController::new(Box::new(board.clone()));

    controller.on(PulseEvent::OnLow, |pin: String| async move {
        println!("Pin {} is back LOW", pin);
    });

    // Pulse pin 11 for 1sec and wait for it.
    controller
        .pulse("11", Duration::from_secs(1))
        .await
        .expect("Pulse completes");

    // Start a 3sec pulse on pin 12 in the background...
    let handle = controller
        .start("12", Duration::from_secs(3))
        .expect("Pulse starts");
    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("{}: pin 12 high={:?}", controller, board.is_high("12"));

    // ...but cancel it after 500ms: the pin is set back LOW.
    controller.stop();
    println!("{:?}", handle.wait().await);
    println!("{}: pin 12 high={:?}", controller, board.is_high("12"));
}
