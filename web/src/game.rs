use crate::api::ApiClient;
use crate::settings::GameProps;
use crate::utils::*;
use gloo::timers::callback::Interval;
use sweepview_core as game;
use sweepview_protocol::{self as protocol, Endpoint, GameState, NewGameReply, NewGameRequest};
use web_sys::HtmlInputElement;
use yew::prelude::*;

const TICK_MILLIS: u32 = 1000;

fn format_timer(secs: u32) -> String {
    format!("Time: {} s", secs)
}

/// Parameters worth remembering for the next visit: only those the server
/// accepted.
fn accepted_params(
    params: game::GameParams,
    command: game::TimerCommand,
) -> Option<game::GameParams> {
    (command == game::TimerCommand::Restart).then_some(params)
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellMsg {
    Primary(game::Coord2),
    Secondary(game::Coord2),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum FormField {
    Rows,
    Cols,
    Mines,
}

#[derive(Debug)]
pub(crate) enum Msg {
    CellEvent(CellMsg),
    EditForm(FormField, String),
    NewGame,
    NewGameDone(game::GameParams, protocol::Result<NewGameReply>),
    ActionDone(game::CellCommand, protocol::Result<GameState>),
    UpdateTime,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    row: game::Coord,
    col: game::Coord,
    cell: game::CellView,
    callback: Callback<CellMsg>,
}

#[function_component(CellTile)]
fn cell_component(props: &CellProps) -> Html {
    let CellProps {
        row,
        col,
        cell,
        callback,
    } = props.clone();

    let class = classes!((!cell.class().is_empty()).then_some(cell.class()));
    let value = cell.value().map(|value| value.to_wire().to_string());

    let onclick = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            log::trace!("({}, {}) primary", row, col);
            callback.emit(CellMsg::Primary((row, col)));
        })
    };

    let oncontextmenu = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        log::trace!("({}, {}) secondary", row, col);
        callback.emit(CellMsg::Secondary((row, col)));
    });

    html! {
        <td
            {class}
            data-row={row.to_string()}
            data-col={col.to_string()}
            data-revealed={cell.is_revealed().to_string()}
            data-flagged={cell.is_flagged().to_string()}
            data-value={value}
            {onclick}
            {oncontextmenu}
        >
            {cell.glyph()}
        </td>
    }
}

#[derive(Debug)]
pub(crate) struct GameView {
    controller: game::BoardController,
    form: game::GameForm,
    api: ApiClient,
    prev_time: u32,
    timer: game::TimerSlot<Interval>,
}

impl GameView {
    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(TICK_MILLIS, move || link.send_message(Msg::UpdateTime))
    }

    fn run_timer_command(&mut self, ctx: &Context<Self>, command: game::TimerCommand) {
        self.timer.apply(command, || Self::create_timer(ctx));
        self.prev_time = self.controller.elapsed_secs(utc_now());
    }

    fn get_time(&self) -> u32 {
        self.controller.elapsed_secs(utc_now())
    }

    fn request_new_game(&mut self, ctx: &Context<Self>) -> bool {
        let Ok(params) = self.controller.start_new_game(&self.form) else {
            return true;
        };

        let api = self.api.clone();
        ctx.link().send_future(async move {
            let request = NewGameRequest::from(params);
            let reply = api.post(Endpoint::NewGame, &request).await;
            Msg::NewGameDone(params, reply)
        });
        false
    }

    fn request_cell_action(&self, ctx: &Context<Self>, command: game::CellCommand) {
        log::debug!("sending {:?}", command);
        let api = self.api.clone();
        ctx.link().send_future(async move {
            let reply = api
                .post(command.action.endpoint(), &command.request())
                .await;
            Msg::ActionDone(command, reply)
        });
    }

    fn view_form_input(
        &self,
        ctx: &Context<Self>,
        field: FormField,
        label: &'static str,
        value: &str,
    ) -> Html {
        let oninput = ctx.link().callback(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::EditForm(field, input.value())
        });

        html! {
            <label>
                {label}
                <input type="number" min="1" value={value.to_owned()} {oninput}/>
            </label>
        }
    }

    fn view_board(&self, ctx: &Context<Self>) -> Html {
        let Some(board) = self.controller.board() else {
            return html! {};
        };
        let (rows, cols) = board.size();

        html! {
            <>{ for (0..rows).map(|row| html! {
                <tr>
                    {
                        for (0..cols).map(|col| {
                            let cell = board.cell_at((row, col)).unwrap_or_default();
                            let callback = ctx.link().callback(Msg::CellEvent);
                            html! {
                                <CellTile {row} {col} {cell} {callback}/>
                            }
                        })
                    }
                </tr>
            }) }</>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let params = props.initial_params(LocalOrDefault::local_or_default());
        log::debug!("initial params: {:?}", params);

        // a fresh page always opens with a game in progress
        ctx.link().send_message(Msg::NewGame);

        Self {
            controller: game::BoardController::new(),
            form: game::GameForm::from_params(params),
            api: ApiClient::new(&props.api_base),
            prev_time: 0,
            timer: game::TimerSlot::empty(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use CellMsg::*;
        use Msg::*;

        match msg {
            CellEvent(Primary(pos)) => {
                if let Some(command) = self.controller.handle_primary_activate(pos) {
                    self.request_cell_action(ctx, command);
                } else {
                    log::trace!("nothing to do at {:?}", pos);
                }
                false
            }
            CellEvent(Secondary(pos)) => {
                let command = self.controller.handle_secondary_activate(pos);
                self.request_cell_action(ctx, command);
                false
            }
            EditForm(field, value) => {
                let slot = match field {
                    FormField::Rows => &mut self.form.rows,
                    FormField::Cols => &mut self.form.cols,
                    FormField::Mines => &mut self.form.mines,
                };
                *slot = value;
                true
            }
            NewGame => self.request_new_game(ctx),
            NewGameDone(params, reply) => {
                let command = self.controller.finish_new_game(params, reply, utc_now());
                if let Some(params) = accepted_params(params, command) {
                    params.local_save();
                }
                self.run_timer_command(ctx, command);
                true
            }
            ActionDone(command, reply) => {
                if let Some(timer) = self.controller.finish_action(command, reply, utc_now()) {
                    self.run_timer_command(ctx, timer);
                }
                true
            }
            UpdateTime => {
                let time = self.get_time();
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let status = self.controller.status().to_string();
        let elapsed_time = format_timer(self.get_time());
        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });

        html! {
            <div class="sweepview" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <nav>
                    { self.view_form_input(ctx, FormField::Rows, "Rows", &self.form.rows) }
                    { self.view_form_input(ctx, FormField::Cols, "Cols", &self.form.cols) }
                    { self.view_form_input(ctx, FormField::Mines, "Mines", &self.form.mines) }
                    <button id="newGameBtn" type="button" onclick={cb_new_game}>{"New Game"}</button>
                </nav>
                <aside id="game-status">{status}</aside>
                <aside id="game-timer">{elapsed_time}</aside>
                <table id="board">
                    { self.view_board(ctx) }
                </table>
            </div>
        }
    }
}
